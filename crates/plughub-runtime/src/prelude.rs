//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use plughub_core::{AppError, AppResult};

pub use crate::hooks::callback::{ActionCallback, FilterCallback, HookValue, action_fn, filter_fn};
pub use crate::hooks::dispatcher::HookDispatcher;
pub use crate::hooks::registrar::HookRegistrar;
pub use crate::hooks::registry::{DEFAULT_MAX_ARGS, DEFAULT_PRIORITY, HookRegistry};
pub use crate::loader::{PluginLoader, StaticLoader};
pub use crate::manager::PluginManager;
pub use crate::plugin::{Plugin, PluginMetadata};

pub use crate::{hook_args, plugin_metadata};
