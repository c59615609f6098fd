//! The plugin capability set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use plughub_core::AppResult;

use crate::hooks::registrar::HookRegistrar;

/// Self-description every plugin provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Names of plugins that must be active before this one.
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    /// Creates metadata with just a name and version; the rest defaults to
    /// empty.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: String::new(),
            dependencies: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Adds a dependency on another plugin.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }
}

/// Trait every plugin implements.
///
/// Lifecycle methods default to no-ops so a plugin only writes the parts it
/// cares about; `register_hooks` is the one capability that has no sensible
/// default, since a plugin that hooks nothing does nothing.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Returns the plugin's self-description.
    fn metadata(&self) -> PluginMetadata;

    /// Returns whether the plugin can run against the current host.
    fn is_compatible(&self) -> bool {
        true
    }

    /// Registers the plugin's callbacks. Called during activation, after
    /// compatibility and dependency checks pass.
    async fn register_hooks(&self, registrar: &HookRegistrar) -> AppResult<()>;

    /// Called after hooks are registered, when the plugin becomes active.
    async fn on_activate(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the plugin is deactivated, before its hooks are removed.
    async fn on_deactivate(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the plugin is removed. Best-effort; failure is logged
    /// and removal proceeds.
    async fn uninstall(&self) -> AppResult<()> {
        Ok(())
    }
}
