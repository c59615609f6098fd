//! Collaborator contracts consumed by the plugin runtime.

pub mod source;
pub mod store;

pub use source::{PluginSource, SourceEntry};
pub use store::CatalogStore;
