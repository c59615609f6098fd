//! Statistics CLI command.

use clap::Args;

use crate::output::{self, OutputFormat};
use plughub_core::error::AppError;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {}

/// Execute the stats command
pub async fn execute(_args: &StatsArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env).await?;
    let manager = super::build_manager(&config).await?;

    let stats = manager.stats().await;
    match format {
        OutputFormat::Json => output::print_json(&stats),
        OutputFormat::Table => {
            println!("Plugins:");
            output::print_kv("Total", &stats.total.to_string());
            output::print_kv("Active", &stats.active.to_string());
            output::print_kv("Inactive", &stats.inactive.to_string());
            output::print_kv("Installed", &stats.installed.to_string());
            output::print_kv("Error", &stats.error.to_string());
            println!("Hooks:");
            output::print_kv("Actions", &stats.hooks.actions.to_string());
            output::print_kv("Filters", &stats.hooks.filters.to_string());
        }
    }
    Ok(())
}
