//! Hook inspection CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use plughub_core::error::AppError;

/// Arguments for hook commands
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Hooks subcommand
    #[command(subcommand)]
    pub command: HooksCommand,
}

/// Hook subcommands
#[derive(Debug, Subcommand)]
pub enum HooksCommand {
    /// List registered hook names with callback counts
    List,
}

/// Hook display row for table output
#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    /// Hook name
    hook: String,
    /// Kind (action or filter)
    kind: String,
    /// Callbacks
    callbacks: usize,
}

/// Execute hook commands
pub async fn execute(args: &HooksArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env).await?;
    let manager = super::build_manager(&config).await?;

    match &args.command {
        HooksCommand::List => {
            let registry = manager.hook_registry();
            let mut rows = Vec::new();

            for hook in registry.action_names().await {
                let callbacks = registry.action_count(&hook).await;
                rows.push(HookRow {
                    hook,
                    kind: "action".to_string(),
                    callbacks,
                });
            }
            for hook in registry.filter_names().await {
                let callbacks = registry.filter_count(&hook).await;
                rows.push(HookRow {
                    hook,
                    kind: "filter".to_string(),
                    callbacks,
                });
            }

            output::print_list(&rows, format);
            Ok(())
        }
    }
}
