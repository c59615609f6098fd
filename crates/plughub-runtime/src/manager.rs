//! Plugin lifecycle manager — discovery, activation, deactivation, removal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use plughub_core::traits::{CatalogStore, PluginSource};
use plughub_core::types::{HookStats, PluginRecord, PluginStats};
use plughub_core::{AppError, AppResult};

use crate::catalog::PluginCatalog;
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registrar::HookRegistrar;
use crate::hooks::registry::HookRegistry;
use crate::loader::PluginLoader;
use crate::plugin::Plugin;

/// Drives every plugin through its lifecycle and owns the only map of live
/// plugin instances.
///
/// The hook registry knows nothing about plugins; the sole connection
/// between the two subsystems is the owner-tagged registrar handed to
/// `register_hooks` during activation.
pub struct PluginManager {
    /// Record catalog (metadata + persistence).
    catalog: PluginCatalog,
    /// Hook registry shared with the dispatcher.
    hooks: Arc<HookRegistry>,
    /// Dispatcher for firing hooks.
    dispatcher: Arc<HookDispatcher>,
    /// Capability loader collaborator.
    loader: Arc<dyn PluginLoader>,
    /// Source lister collaborator.
    source: Arc<dyn PluginSource>,
    /// Live instances, keyed by plugin name. Present only while Active.
    loaded: RwLock<HashMap<String, Arc<dyn Plugin>>>,
    /// Serializes lifecycle mutations (sync, activate, deactivate, remove).
    ///
    /// Each mutation spans several per-structure locks; without this outer
    /// lock two concurrent activations of the same plugin could both pass
    /// the is-active check and register its hooks twice. Hook fires do not
    /// take it, they snapshot the registry instead.
    lifecycle: Mutex<()>,
}

impl PluginManager {
    /// Creates a manager wired to its three collaborators.
    pub fn new(
        source: Arc<dyn PluginSource>,
        loader: Arc<dyn PluginLoader>,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let dispatcher = Arc::new(HookDispatcher::new(hooks.clone()));

        Self {
            catalog: PluginCatalog::new(store),
            hooks,
            dispatcher,
            loader,
            source,
            loaded: RwLock::new(HashMap::new()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Loads the catalog from the durable store.
    pub async fn initialize(&self) -> AppResult<()> {
        self.catalog.load().await?;
        info!("Plugin system initialized");
        Ok(())
    }

    /// Re-loads every plugin the catalog says is active.
    ///
    /// Called at startup so hooks registered in a previous process lifetime
    /// come back. Per-plugin failures are recorded on the record and never
    /// abort the rest.
    pub async fn load_active_plugins(&self) {
        let _guard = self.lifecycle.lock().await;
        for record in self.catalog.list().await {
            if !record.is_running() {
                continue;
            }
            if let Err(e) = self.load_instance(&record.name).await {
                error!(plugin = %record.name, error = %e, "Failed to load active plugin");
                if let Err(store_err) = self.catalog.mark_error(&record.name, &e.message).await {
                    warn!(plugin = %record.name, error = %store_err, "Failed to record plugin error");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle operations
    // ------------------------------------------------------------------

    /// Scans plugin sources and synchronizes the catalog.
    ///
    /// Newly discovered plugins are recorded without being activated;
    /// previously recorded plugins whose source is gone are soft-removed.
    /// Per-plugin failures are logged and never abort the sync. Running
    /// `sync` twice with no source changes produces no state change.
    pub async fn sync(&self) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        let entries = self.source.list_plugin_sources().await?;
        let discovered: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();

        for entry in &entries {
            match self.loader.load(&entry.name).await {
                Ok(plugin) => {
                    let meta = plugin.metadata();
                    if let Err(e) = self.catalog.upsert_discovered(&meta).await {
                        error!(plugin = %entry.name, error = %e, "Failed to record discovered plugin");
                    }
                }
                Err(e) => {
                    error!(plugin = %entry.name, error = %e, "Failed to read plugin metadata");
                }
            }
        }

        // Soft-remove records whose source is no longer discoverable so
        // nothing dangles in the Active state.
        for record in self.catalog.list().await {
            if record.is_installed && !discovered.contains(&record.name) {
                if record.is_active {
                    self.drop_instance(&record.name).await;
                }
                if let Err(e) = self.catalog.mark_missing(&record.name).await {
                    error!(plugin = %record.name, error = %e, "Failed to soft-remove plugin");
                }
                info!(plugin = %record.name, "Plugin source missing, marked uninstalled");
            }
        }

        info!(discovered = discovered.len(), "Plugin sync complete");
        Ok(())
    }

    /// Activates a plugin.
    ///
    /// Activating an already-active plugin is a success, not an error. Any
    /// failure is all-or-nothing: the record transitions to Error with the
    /// captured message, no instance is retained, and no hook entries from
    /// this attempt survive.
    pub async fn activate(&self, name: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        let record = self
            .catalog
            .get(name)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;

        if !record.is_installed {
            return Err(AppError::not_installed(format!(
                "Plugin '{name}' is not installed"
            )));
        }

        if record.is_active {
            debug!(plugin = %name, "Plugin already active");
            return Ok(());
        }

        let plugin = match self.load_instance(name).await {
            Ok(plugin) => plugin,
            Err(e) => {
                self.record_failure(name, &e).await;
                return Err(e);
            }
        };

        if let Err(e) = plugin.on_activate().await {
            let e = AppError::new(
                plughub_core::error::ErrorKind::Activation,
                format!("Plugin '{name}' on_activate failed: {}", e.message),
            );
            self.drop_instance(name).await;
            self.record_failure(name, &e).await;
            return Err(e);
        }

        // A store failure here must not leave a half-activated plugin: the
        // caller sees the error, so the instance and its hooks go too.
        if let Err(e) = self.catalog.mark_active(name).await {
            self.drop_instance(name).await;
            self.record_failure(name, &e).await;
            return Err(e);
        }

        info!(plugin = %name, "Plugin activated");
        Ok(())
    }

    /// Deactivates a plugin.
    ///
    /// Deactivating an already-inactive plugin is a success. Cleanup is
    /// best-effort: a failing `on_deactivate` is logged and the plugin is
    /// still torn down, because leaving it stuck Active is worse.
    pub async fn deactivate(&self, name: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.deactivate_inner(name).await
    }

    /// Deactivation body; caller holds the lifecycle lock.
    async fn deactivate_inner(&self, name: &str) -> AppResult<()> {
        let record = self
            .catalog
            .get(name)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;

        if !record.is_active {
            debug!(plugin = %name, "Plugin already inactive");
            return Ok(());
        }

        let handle = self.loaded.write().await.remove(name);
        if let Some(plugin) = handle {
            if let Err(e) = plugin.on_deactivate().await {
                warn!(plugin = %name, error = %e, "on_deactivate returned error");
            }
        }

        self.hooks.deregister_owner(name).await;
        self.catalog.mark_inactive(name).await?;
        info!(plugin = %name, "Plugin deactivated");
        Ok(())
    }

    /// Removes a plugin from the catalog entirely.
    ///
    /// Auto-deactivates first if needed, then invokes the plugin's
    /// `uninstall` capability best-effort. Reclaiming plugin-owned storage
    /// is left to the collaborator that owns it; a later re-discovery
    /// creates a fresh record.
    pub async fn remove(&self, name: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        let record = self
            .catalog
            .get(name)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;

        if record.is_active {
            self.deactivate_inner(name).await?;
        }

        match self.loader.load(name).await {
            Ok(plugin) => {
                if let Err(e) = plugin.uninstall().await {
                    warn!(plugin = %name, error = %e, "Plugin uninstall failed");
                }
            }
            Err(e) => {
                debug!(plugin = %name, error = %e, "Skipping uninstall, capability unavailable");
            }
        }

        self.catalog.remove(name).await?;
        info!(plugin = %name, "Plugin removed");
        Ok(())
    }

    /// Returns whether every declared dependency of `name` is Active.
    pub async fn check_dependencies(&self, name: &str) -> bool {
        self.catalog.dependencies_satisfied(name).await
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Returns all catalog records, sorted by name.
    pub async fn list_plugins(&self) -> Vec<PluginRecord> {
        self.catalog.list().await
    }

    /// Returns the record for `name`.
    pub async fn plugin_info(&self, name: &str) -> Option<PluginRecord> {
        self.catalog.get(name).await
    }

    /// Returns whether `name` is currently active.
    pub async fn is_active(&self, name: &str) -> bool {
        self.catalog
            .get(name)
            .await
            .map(|r| r.is_running())
            .unwrap_or(false)
    }

    /// Returns the names of plugins with a live instance.
    pub async fn loaded_plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns catalog and hook statistics.
    pub async fn stats(&self) -> PluginStats {
        let mut stats = self.catalog.stats().await;
        stats.hooks = HookStats {
            actions: self.hooks.action_names().await.len(),
            filters: self.hooks.filter_names().await.len(),
        };
        stats
    }

    // ------------------------------------------------------------------
    // Hook surface
    // ------------------------------------------------------------------

    /// Fires an action hook through the dispatcher.
    pub async fn fire_action(&self, hook: &str, args: &[crate::hooks::callback::HookValue]) {
        self.dispatcher.fire_action(hook, args).await;
    }

    /// Applies a filter hook through the dispatcher.
    pub async fn apply_filter(
        &self,
        hook: &str,
        value: crate::hooks::callback::HookValue,
        args: &[crate::hooks::callback::HookValue],
    ) -> crate::hooks::callback::HookValue {
        self.dispatcher.apply_filter(hook, value, args).await
    }

    /// Returns the dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Loads and wires a plugin instance: capability load, compatibility
    /// check, dependency check, hook registration, handle storage.
    ///
    /// Hook registration is deliberately the last step; if it fails
    /// part-way, everything this plugin registered is removed before the
    /// error propagates, so no partial registration is ever observable.
    async fn load_instance(&self, name: &str) -> AppResult<Arc<dyn Plugin>> {
        if let Some(existing) = self.loaded.read().await.get(name) {
            return Ok(existing.clone());
        }

        let plugin = self.loader.load(name).await?;

        if !plugin.is_compatible() {
            return Err(AppError::incompatible(format!(
                "Plugin '{name}' is not compatible with this host"
            )));
        }

        let unsatisfied = self.catalog.unsatisfied_dependencies(name).await;
        if !unsatisfied.is_empty() {
            return Err(AppError::dependency_unsatisfied(format!(
                "Plugin '{name}' requires active plugins: {}",
                unsatisfied.join(", ")
            )));
        }

        let registrar = HookRegistrar::new(self.hooks.clone(), name);
        if let Err(e) = plugin.register_hooks(&registrar).await {
            self.hooks.deregister_owner(name).await;
            return Err(AppError::activation(format!(
                "Plugin '{name}' register_hooks failed: {}",
                e.message
            )));
        }

        self.loaded
            .write()
            .await
            .insert(name.to_string(), plugin.clone());

        debug!(plugin = %name, "Plugin instance loaded");
        Ok(plugin)
    }

    /// Drops the live instance and every hook entry owned by `name`.
    async fn drop_instance(&self, name: &str) {
        self.loaded.write().await.remove(name);
        self.hooks.deregister_owner(name).await;
    }

    /// Persists an activation failure on the record; the caller still gets
    /// the original error.
    async fn record_failure(&self, name: &str, error: &AppError) {
        error!(plugin = %name, error = %error, "Plugin activation failed");
        if let Err(store_err) = self.catalog.mark_error(name, &error.message).await {
            warn!(plugin = %name, error = %store_err, "Failed to record plugin error");
        }
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager").finish()
    }
}
