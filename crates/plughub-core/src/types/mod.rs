//! Shared domain types for the plugin runtime.

pub mod record;
pub mod stats;

pub use record::{PluginRecord, PluginStatus};
pub use stats::{HookStats, PluginStats};
