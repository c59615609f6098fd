//! Plugin source implementations.

use std::path::PathBuf;

use async_trait::async_trait;

use tracing::warn;

use plughub_core::AppResult;
use plughub_core::traits::{PluginSource, SourceEntry};

use crate::loader::PluginLoader;

/// Lists plugin sources from a filesystem directory.
///
/// Each subdirectory is one plugin source named after the directory; files
/// with the platform shared-library suffix are also accepted for dynamic
/// plugins, named after the library stem. A missing directory yields an
/// empty list rather than an error so a fresh install syncs cleanly.
pub struct DirectorySource {
    directory: PathBuf,
}

impl DirectorySource {
    /// Creates a source over `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl PluginSource for DirectorySource {
    async fn list_plugin_sources(&self) -> AppResult<Vec<SourceEntry>> {
        if !self.directory.exists() {
            warn!(directory = %self.directory.display(), "Plugin directory does not exist");
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(&self.directory)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();

            let name = if path.is_dir() {
                path.file_name().map(|n| n.to_string_lossy().into_owned())
            } else {
                library_stem(&path)
            };

            if let Some(name) = name {
                entries.push(SourceEntry {
                    name,
                    locator: path,
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// Strips the platform library prefix/suffix from a shared-library path.
fn library_stem(path: &std::path::Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    let suffix = std::env::consts::DLL_SUFFIX;
    let prefix = std::env::consts::DLL_PREFIX;

    let stem = file_name.strip_suffix(suffix)?;
    Some(stem.strip_prefix(prefix).unwrap_or(stem).to_string())
}

/// Adapter exposing an enumerable [`PluginLoader`] as a plugin source.
///
/// Compiled-in plugins have no filesystem presence, so `sync` discovers
/// them straight from the loader's registration table.
pub struct LoaderSource<L> {
    loader: std::sync::Arc<L>,
}

impl<L: PluginLoader> LoaderSource<L> {
    /// Wraps `loader` as a source.
    pub fn new(loader: std::sync::Arc<L>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl<L: PluginLoader> PluginSource for LoaderSource<L> {
    async fn list_plugin_sources(&self) -> AppResult<Vec<SourceEntry>> {
        Ok(self
            .loader
            .known_names()
            .await
            .into_iter()
            .map(|name| SourceEntry {
                locator: PathBuf::from(&name),
                name,
            })
            .collect())
    }
}
