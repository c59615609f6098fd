//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing plugin packages.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether to automatically load active plugins on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Path to the durable plugin catalog file.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            auto_load: default_true(),
            catalog_file: default_catalog_file(),
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_catalog_file() -> String {
    "data/plugins.json".to_string()
}

fn default_true() -> bool {
    true
}
