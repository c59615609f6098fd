//! Owner-scoped registration handle passed to plugins.

use std::sync::Arc;

use super::callback::{ActionCallback, FilterCallback};
use super::registry::{DEFAULT_MAX_ARGS, DEFAULT_PRIORITY, HookRegistry};

/// Registration facade handed to a plugin's `register_hooks`.
///
/// Every entry registered through it is tagged with the owning plugin's
/// name, which is what makes all-or-nothing activation and full cleanup on
/// deactivation possible: the lifecycle manager can drop everything a
/// plugin registered with a single `deregister_owner` call.
pub struct HookRegistrar {
    registry: Arc<HookRegistry>,
    owner: String,
}

impl HookRegistrar {
    /// Creates a registrar binding `owner` to every registration.
    pub fn new(registry: Arc<HookRegistry>, owner: impl Into<String>) -> Self {
        Self {
            registry,
            owner: owner.into(),
        }
    }

    /// The plugin name this registrar tags entries with.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Registers an action callback owned by this plugin.
    pub async fn register_action(
        &self,
        hook: &str,
        callback: Arc<dyn ActionCallback>,
        priority: i32,
        max_args: usize,
    ) {
        self.registry
            .register_action_owned(hook, callback, priority, max_args, Some(self.owner.clone()))
            .await;
    }

    /// Registers an action with the default priority and arg count.
    pub async fn add_action(&self, hook: &str, callback: Arc<dyn ActionCallback>) {
        self.register_action(hook, callback, DEFAULT_PRIORITY, DEFAULT_MAX_ARGS)
            .await;
    }

    /// Registers a filter callback owned by this plugin.
    pub async fn register_filter(
        &self,
        hook: &str,
        callback: Arc<dyn FilterCallback>,
        priority: i32,
        max_args: usize,
    ) {
        self.registry
            .register_filter_owned(hook, callback, priority, max_args, Some(self.owner.clone()))
            .await;
    }

    /// Registers a filter with the default priority and arg count.
    pub async fn add_filter(&self, hook: &str, callback: Arc<dyn FilterCallback>) {
        self.register_filter(hook, callback, DEFAULT_PRIORITY, DEFAULT_MAX_ARGS)
            .await;
    }
}

impl std::fmt::Debug for HookRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistrar")
            .field("owner", &self.owner)
            .finish()
    }
}
