//! Plugin lifecycle CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use plughub_core::error::AppError;
use plughub_core::types::PluginRecord;

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginArgs {
    /// Plugin subcommand
    #[command(subcommand)]
    pub command: PluginCommand,
}

/// Plugin subcommands
#[derive(Debug, Subcommand)]
pub enum PluginCommand {
    /// Scan the plugin directory and synchronize the catalog
    Sync,
    /// List all known plugins
    List {
        /// Show only active plugins
        #[arg(short, long)]
        active: bool,
    },
    /// Show details for one plugin
    Info {
        /// Plugin name
        name: String,
    },
    /// Activate a plugin
    Activate {
        /// Plugin name
        name: String,
    },
    /// Deactivate a plugin
    Deactivate {
        /// Plugin name
        name: String,
    },
    /// Remove a plugin from the catalog
    Remove {
        /// Plugin name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Plugin display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Name
    name: String,
    /// Version
    version: String,
    /// Status
    status: String,
    /// Installed
    installed: String,
    /// Dependencies
    dependencies: String,
}

impl From<&PluginRecord> for PluginRow {
    fn from(record: &PluginRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            status: record.status.to_string(),
            installed: if record.is_installed { "yes" } else { "no" }.to_string(),
            dependencies: record.dependencies.join(", "),
        }
    }
}

/// Execute plugin commands
pub async fn execute(args: &PluginArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env).await?;
    let manager = super::build_manager(&config).await?;

    match &args.command {
        PluginCommand::Sync => {
            manager.sync().await?;
            let records = manager.list_plugins().await;
            output::print_success(&format!("Catalog synchronized ({} plugins)", records.len()));
            Ok(())
        }
        PluginCommand::List { active } => {
            let records = manager.list_plugins().await;
            let rows: Vec<PluginRow> = records
                .iter()
                .filter(|r| !active || r.is_active)
                .map(PluginRow::from)
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
        PluginCommand::Info { name } => {
            let record = manager
                .plugin_info(name)
                .await
                .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;

            match format {
                OutputFormat::Json => output::print_json(&record),
                OutputFormat::Table => print_record(&record),
            }
            Ok(())
        }
        PluginCommand::Activate { name } => {
            manager.activate(name).await?;
            output::print_success(&format!("Plugin '{name}' activated"));
            Ok(())
        }
        PluginCommand::Deactivate { name } => {
            manager.deactivate(name).await?;
            output::print_success(&format!("Plugin '{name}' deactivated"));
            Ok(())
        }
        PluginCommand::Remove { name, yes } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Remove plugin '{name}' from the catalog?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {}", e)))?;
                if !confirm {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }

            manager.remove(name).await?;
            output::print_success(&format!("Plugin '{name}' removed"));
            Ok(())
        }
    }
}

fn print_record(record: &PluginRecord) {
    println!("Plugin: {}", record.name);
    output::print_kv("Version", &record.version);
    output::print_kv("Description", &record.description);
    output::print_kv("Author", &record.author);
    output::print_kv("Status", record.status.as_str());
    output::print_kv(
        "Installed",
        if record.is_installed { "yes" } else { "no" },
    );
    output::print_kv("Dependencies", &record.dependencies.join(", "));
    if let Some(error) = &record.error_message {
        output::print_kv("Last error", error);
    }
    if let Some(installed_at) = &record.installed_at {
        output::print_kv("Installed at", &installed_at.to_rfc3339());
    }
    if let Some(activated_at) = &record.activated_at {
        output::print_kv("Activated at", &activated_at.to_rfc3339());
    }
}
