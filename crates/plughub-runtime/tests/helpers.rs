//! Shared test harness: an in-memory host plus a configurable test plugin.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use plughub_core::AppError;
use plughub_core::AppResult;
use plughub_core::traits::CatalogStore;
use plughub_runtime::hooks::callback::action_fn;
use plughub_runtime::hooks::registrar::HookRegistrar;
use plughub_runtime::loader::StaticLoader;
use plughub_runtime::manager::PluginManager;
use plughub_runtime::plugin::{Plugin, PluginMetadata};
use plughub_runtime::source::LoaderSource;
use plughub_runtime::store::MemoryStore;

/// A fully in-memory host: static loader, loader-backed source, memory
/// store. Every test starts from an initialized, empty manager.
pub struct TestHost {
    pub loader: Arc<StaticLoader>,
    pub store: Arc<dyn CatalogStore>,
    pub manager: PluginManager,
}

impl TestHost {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Builds a host over a caller-supplied store, for failure-injection
    /// tests.
    pub async fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        let loader = Arc::new(StaticLoader::new());
        let manager = PluginManager::new(
            Arc::new(LoaderSource::new(loader.clone())),
            loader.clone(),
            store.clone(),
        );
        manager.initialize().await.expect("initialize");
        Self {
            loader,
            store,
            manager,
        }
    }

    /// Builds a second manager over the same loader and store, as a process
    /// restart would.
    pub async fn restart(&self) -> PluginManager {
        let manager = PluginManager::new(
            Arc::new(LoaderSource::new(self.loader.clone())),
            self.loader.clone(),
            self.store.clone(),
        );
        manager.initialize().await.expect("initialize");
        manager.load_active_plugins().await;
        manager
    }

    /// Registers a plugin with the loader and syncs the catalog.
    pub async fn install(&self, plugin: Arc<dyn Plugin>) {
        self.loader.register(plugin).await;
        self.manager.sync().await.expect("sync");
    }
}

/// Scripted plugin that records every lifecycle call and hook firing.
pub struct TestPlugin {
    meta: PluginMetadata,
    pub events: Arc<Mutex<Vec<String>>>,
    hook: String,
    compatible: bool,
    fail_on_activate: bool,
    fail_register_hooks: bool,
    registration_delay: Option<std::time::Duration>,
}

impl TestPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            meta: PluginMetadata::new(name, "1.0.0"),
            events: Arc::new(Mutex::new(Vec::new())),
            hook: "app.event".to_string(),
            compatible: true,
            fail_on_activate: false,
            fail_register_hooks: false,
            registration_delay: None,
        }
    }

    pub fn depends_on(mut self, name: &str) -> Self {
        self.meta = self.meta.with_dependency(name);
        self
    }

    pub fn on_hook(mut self, hook: &str) -> Self {
        self.hook = hook.to_string();
        self
    }

    pub fn incompatible(mut self) -> Self {
        self.compatible = false;
        self
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_on_activate = true;
        self
    }

    /// Registers one hook successfully, then errors out of `register_hooks`.
    pub fn failing_registration(mut self) -> Self {
        self.fail_register_hooks = true;
        self
    }

    /// Makes `register_hooks` dwell, widening the activation window so
    /// overlapping lifecycle calls would collide if not serialized.
    pub fn slow_registration(mut self, millis: u64) -> Self {
        self.registration_delay = Some(std::time::Duration::from_millis(millis));
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }

    fn record(&self, event: &str) {
        self.events
            .lock()
            .expect("events lock")
            .push(event.to_string());
    }
}

#[async_trait]
impl Plugin for TestPlugin {
    fn metadata(&self) -> PluginMetadata {
        self.meta.clone()
    }

    fn is_compatible(&self) -> bool {
        self.compatible
    }

    async fn register_hooks(&self, registrar: &HookRegistrar) -> AppResult<()> {
        if let Some(delay) = self.registration_delay {
            tokio::time::sleep(delay).await;
        }
        let events = self.events.clone();
        let name = self.meta.name.clone();
        registrar
            .add_action(
                &self.hook,
                action_fn(move |_args| {
                    events
                        .lock()
                        .expect("events lock")
                        .push(format!("{name}:fired"));
                    Ok(())
                }),
            )
            .await;

        if self.fail_register_hooks {
            return Err(AppError::internal("registration blew up half-way"));
        }
        Ok(())
    }

    async fn on_activate(&self) -> AppResult<()> {
        if self.fail_on_activate {
            return Err(AppError::internal("activation hook refused"));
        }
        self.record("on_activate");
        Ok(())
    }

    async fn on_deactivate(&self) -> AppResult<()> {
        self.record("on_deactivate");
        Ok(())
    }

    async fn uninstall(&self) -> AppResult<()> {
        self.record("uninstall");
        Ok(())
    }
}
