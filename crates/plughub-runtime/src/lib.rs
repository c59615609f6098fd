//! # plughub-runtime
//!
//! Extension runtime for Plughub. Provides:
//!
//! - Hook registry with priority-ordered action and filter tables
//! - Hook dispatcher with fault isolation between callbacks
//! - Plugin capability trait with default lifecycle methods
//! - Plugin lifecycle manager (sync, activate, deactivate, remove)
//! - Capability loaders: compiled-in table, optional dynamic loading via
//!   `libloading`

pub mod catalog;
pub mod hooks;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod plugin;
pub mod prelude;
pub mod source;
pub mod store;

pub use hooks::callback::{ActionCallback, FilterCallback, HookValue, action_fn, filter_fn};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registrar::HookRegistrar;
pub use hooks::registry::{DEFAULT_MAX_ARGS, DEFAULT_PRIORITY, HookRegistry};
pub use loader::{PluginLoader, StaticLoader};
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginMetadata};
pub use source::DirectorySource;
pub use store::{JsonFileStore, MemoryStore};
