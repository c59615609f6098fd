//! Plugin capability loaders.
//!
//! The lifecycle manager never inspects loader internals: anything that can
//! turn a plugin name into a capability object works. Two implementations
//! are provided, a compiled-in registration table and a `libloading`-based
//! dynamic loader behind the `dynamic` feature.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use plughub_core::{AppError, AppResult};

use crate::plugin::Plugin;

/// Turns a plugin name into its capability object.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    /// Loads the capability object for `name`.
    async fn load(&self, name: &str) -> AppResult<Arc<dyn Plugin>>;

    /// Returns the names this loader can resolve, if enumerable.
    ///
    /// Enumerable loaders double as a plugin source for compiled-in
    /// plugins; non-enumerable loaders return an empty list.
    async fn known_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Compiled-in plugin table.
///
/// The host registers plugin instances at startup; `load` hands out clones
/// of the registered `Arc`s. This is the explicit-registration variant of
/// capability discovery.
pub struct StaticLoader {
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
}

impl StaticLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a plugin instance under its metadata name.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) {
        let name = plugin.metadata().name;
        self.plugins.write().await.insert(name, plugin);
    }

    /// Removes a plugin from the table. Subsequent loads of `name` fail.
    pub async fn unregister(&self, name: &str) {
        self.plugins.write().await.remove(name);
    }
}

impl Default for StaticLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginLoader for StaticLoader {
    async fn load(&self, name: &str) -> AppResult<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::activation(format!("No registered plugin named '{name}'")))
    }

    async fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Dynamic plugin loader using `libloading` (feature-gated).
#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tracing::info;

    use plughub_core::{AppError, AppResult};

    use crate::plugin::Plugin;

    /// Type of the plugin creation function exported by dynamic plugins.
    ///
    /// Dynamic plugins must export: `extern "C" fn create_plugin() -> *mut dyn Plugin`
    pub type CreatePluginFn = unsafe extern "C" fn() -> *mut dyn Plugin;

    /// Loads plugins from shared libraries (.so / .dll / .dylib) found in a
    /// directory, resolving `name` to the platform library filename.
    pub struct DynamicLoader {
        /// Directory containing plugin shared libraries.
        directory: PathBuf,
        /// Loaded libraries (kept alive for the lifetime of the loader).
        libraries: Mutex<Vec<libloading::Library>>,
    }

    impl DynamicLoader {
        /// Creates a loader over `directory`.
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            Self {
                directory: directory.into(),
                libraries: Mutex::new(Vec::new()),
            }
        }

        fn library_path(&self, name: &str) -> PathBuf {
            self.directory.join(format!(
                "{}{}{}",
                std::env::consts::DLL_PREFIX,
                name,
                std::env::consts::DLL_SUFFIX
            ))
        }

        /// Loads a plugin from the given shared library path.
        ///
        /// # Safety
        /// This function loads arbitrary code from a shared library.
        /// Only load trusted plugins.
        pub async unsafe fn load_from_path(&self, path: &Path) -> AppResult<Arc<dyn Plugin>> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                AppError::activation(format!(
                    "Failed to load plugin library '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let create_fn: libloading::Symbol<CreatePluginFn> = unsafe { lib.get(b"create_plugin") }
                .map_err(|e| {
                    AppError::activation(format!(
                        "Plugin '{}' missing 'create_plugin' symbol: {}",
                        path.display(),
                        e
                    ))
                })?;

            let raw_plugin = unsafe { create_fn() };
            let plugin = unsafe { Arc::from_raw(raw_plugin) };

            info!(path = %path.display(), "Dynamic plugin loaded");

            self.libraries.lock().await.push(lib);

            Ok(plugin)
        }
    }

    #[async_trait]
    impl super::PluginLoader for DynamicLoader {
        async fn load(&self, name: &str) -> AppResult<Arc<dyn Plugin>> {
            let path = self.library_path(name);
            if !path.exists() {
                return Err(AppError::activation(format!(
                    "Plugin library not found: {}",
                    path.display()
                )));
            }
            // Safety: dynamic plugin directories are operator-controlled;
            // loading is opt-in via the `dynamic` feature.
            unsafe { self.load_from_path(&path).await }
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("directory", &self.directory)
                .finish()
        }
    }
}

#[cfg(feature = "dynamic")]
pub use dynamic_loader::DynamicLoader;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::registrar::HookRegistrar;
    use crate::plugin::PluginMetadata;

    impl std::fmt::Debug for dyn Plugin {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Plugin")
                .field("name", &self.metadata().name)
                .finish()
        }
    }

    struct Dummy;

    #[async_trait]
    impl Plugin for Dummy {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("dummy", "1.0.0")
        }

        async fn register_hooks(&self, _registrar: &HookRegistrar) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_static_loader_resolves_registered_name() {
        let loader = StaticLoader::new();
        loader.register(Arc::new(Dummy)).await;

        assert!(loader.load("dummy").await.is_ok());
        assert_eq!(loader.known_names().await, vec!["dummy"]);

        let err = loader.load("ghost").await.unwrap_err();
        assert_eq!(err.kind, plughub_core::error::ErrorKind::Activation);
    }
}
