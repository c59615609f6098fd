//! Plugin source listing contract.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::result::AppResult;

/// One discoverable plugin source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Plugin name, derived from the source location.
    pub name: String,
    /// Filesystem location (or other locator) of the plugin package.
    pub locator: PathBuf,
}

/// Lists the plugin sources currently present.
///
/// The runtime calls this during `sync` to discover new plugins and to
/// detect plugins whose source has been removed. Implementations are
/// typically directory scanners, but any registry works.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Returns every discoverable plugin source.
    async fn list_plugin_sources(&self) -> AppResult<Vec<SourceEntry>>;
}
