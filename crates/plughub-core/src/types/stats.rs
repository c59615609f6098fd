//! Aggregated catalog and hook statistics for the read path.

use serde::{Deserialize, Serialize};

/// Counts of registered hook names, split by table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HookStats {
    /// Number of distinct action hook names with at least one callback.
    pub actions: usize,
    /// Number of distinct filter hook names with at least one callback.
    pub filters: usize,
}

/// Catalog-wide plugin statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginStats {
    /// Total known plugins.
    pub total: usize,
    /// Plugins currently active.
    pub active: usize,
    /// Plugins currently inactive.
    pub inactive: usize,
    /// Plugins whose source is present.
    pub installed: usize,
    /// Plugins in the error state.
    pub error: usize,
    /// Registered hook counts.
    pub hooks: HookStats,
}
