//! Plugin catalog records and the lifecycle state machine.
//!
//! A [`PluginRecord`] is pure metadata: one record per known plugin name,
//! created on discovery, mutated by lifecycle transitions, and deleted only
//! by explicit removal. The executable plugin instance itself is held
//! elsewhere, only while the plugin is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a plugin record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Known but not running.
    Inactive,
    /// Running; hooks are live in the dispatcher.
    Active,
    /// Last activation attempt failed; see `error_message`.
    Error,
    /// Installation in progress.
    Installing,
    /// Removal in progress.
    Uninstalling,
}

impl PluginStatus {
    /// Returns the canonical string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Error => "error",
            Self::Installing => "installing",
            Self::Uninstalling => "uninstalling",
        }
    }
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Durable metadata for one known plugin.
///
/// Invariants are maintained by the mutators below, never by direct field
/// writes from outside this crate's consumers:
///
/// - `is_active == true` implies `status == Active`
/// - `status == Error` implies `is_active == false` and `error_message` set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Unique plugin name.
    pub name: String,
    /// Plugin version string (semver-like, not validated).
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Names of plugins that must be active before this one may activate.
    pub dependencies: Vec<String>,
    /// Whether the plugin source is currently present.
    pub is_installed: bool,
    /// Whether the plugin is currently active.
    pub is_active: bool,
    /// Lifecycle status.
    pub status: PluginStatus,
    /// Failure message from the last activation attempt, if any.
    pub error_message: Option<String>,
    /// When the plugin was first discovered.
    pub installed_at: Option<DateTime<Utc>>,
    /// When the plugin was last activated.
    pub activated_at: Option<DateTime<Utc>>,
}

impl PluginRecord {
    /// Creates a freshly discovered record: installed, inactive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            description: String::new(),
            author: String::new(),
            dependencies: Vec::new(),
            is_installed: true,
            is_active: false,
            status: PluginStatus::Inactive,
            error_message: None,
            installed_at: Some(Utc::now()),
            activated_at: None,
        }
    }

    /// Transitions the record to Active.
    pub fn mark_active(&mut self) {
        self.is_active = true;
        self.status = PluginStatus::Active;
        self.activated_at = Some(Utc::now());
        self.error_message = None;
    }

    /// Transitions the record to Inactive.
    pub fn mark_inactive(&mut self) {
        self.is_active = false;
        self.status = PluginStatus::Inactive;
        self.activated_at = None;
        self.error_message = None;
    }

    /// Records an activation failure.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.is_active = false;
        self.status = PluginStatus::Error;
        self.error_message = Some(message.into());
    }

    /// Soft removal: the plugin source is no longer discoverable.
    pub fn mark_missing(&mut self) {
        self.is_installed = false;
        self.is_active = false;
        self.status = PluginStatus::Inactive;
    }

    /// Returns whether the plugin is active per both flags.
    pub fn is_running(&self) -> bool {
        self.is_active && self.status == PluginStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_installed_inactive() {
        let record = PluginRecord::new("metrics");
        assert!(record.is_installed);
        assert!(!record.is_active);
        assert_eq!(record.status, PluginStatus::Inactive);
        assert!(record.installed_at.is_some());
    }

    #[test]
    fn test_active_invariant() {
        let mut record = PluginRecord::new("metrics");
        record.mark_active();
        assert!(record.is_running());
        assert!(record.activated_at.is_some());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_error_invariant() {
        let mut record = PluginRecord::new("metrics");
        record.mark_active();
        record.mark_error("load failed");
        assert!(!record.is_active);
        assert_eq!(record.status, PluginStatus::Error);
        assert_eq!(record.error_message.as_deref(), Some("load failed"));
    }

    #[test]
    fn test_error_recoverable_by_activation() {
        let mut record = PluginRecord::new("metrics");
        record.mark_error("boom");
        record.mark_active();
        assert!(record.is_running());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_mark_missing_clears_active() {
        let mut record = PluginRecord::new("metrics");
        record.mark_active();
        record.mark_missing();
        assert!(!record.is_installed);
        assert!(!record.is_active);
        assert_eq!(record.status, PluginStatus::Inactive);
    }

    #[test]
    fn test_status_serde_form() {
        let json = serde_json::to_string(&PluginStatus::Uninstalling).unwrap();
        assert_eq!(json, "\"uninstalling\"");
    }
}
