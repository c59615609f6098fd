//! CLI command definitions and dispatch.

pub mod hooks;
pub mod plugin;
pub mod stats;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use plughub_core::config::AppConfig;
use plughub_core::error::AppError;
use plughub_runtime::loader::DynamicLoader;
use plughub_runtime::manager::PluginManager;
use plughub_runtime::source::DirectorySource;
use plughub_runtime::store::JsonFileStore;

/// Plughub — In-Process Extension Runtime
#[derive(Debug, Parser)]
#[command(name = "plughub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (config/<env>.toml)
    #[arg(short, long, default_value = "default")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plugin lifecycle management
    Plugin(plugin::PluginArgs),
    /// Registered hook inspection
    Hooks(hooks::HooksArgs),
    /// Plugin and hook statistics
    Stats(stats::StatsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Plugin(args) => plugin::execute(args, &self.env, self.format).await,
            Commands::Hooks(args) => hooks::execute(args, &self.env, self.format).await,
            Commands::Stats(args) => stats::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for the given environment
pub async fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: build a manager over the configured plugin directory and catalog
pub async fn build_manager(config: &AppConfig) -> Result<PluginManager, AppError> {
    let source = Arc::new(DirectorySource::new(&config.plugins.directory));
    let loader = Arc::new(DynamicLoader::new(&config.plugins.directory));
    let store = Arc::new(JsonFileStore::new(&config.plugins.catalog_file));

    let manager = PluginManager::new(source, loader, store);
    manager.initialize().await?;
    if config.plugins.auto_load {
        manager.load_active_plugins().await;
    }
    Ok(manager)
}
