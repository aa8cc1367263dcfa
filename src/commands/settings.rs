//! Settings, backup and restore CLI commands.

use std::path::PathBuf;

use clap::{ArgAction, Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use alextras::App;
use alextras_core::{AppError, AppResult};
use alextras_store::{backup, keys};

use crate::output::{self, OutputFormat};

/// Arguments for settings commands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the settings of a module
    Get {
        /// Module id
        module: String,
        /// Only show one setting
        key: Option<String>,
    },
    /// Change a setting; the value is parsed as JSON, falling back to a string
    Set {
        /// Module id
        module: String,
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// Write a backup of all settings
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore settings from a backup
    Import {
        /// Backup file
        file: PathBuf,
    },
    /// Delete every setting and module state
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Toggle verbose logging
    Verbose {
        /// on or off
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Store or forget the AniList access token
    Token {
        /// Access token; removes the stored token when omitted
        token: Option<String>,
    },
}

/// Setting display row for table output
#[derive(Debug, Serialize, Tabled)]
struct SettingRow {
    key: String,
    value: String,
    default: String,
}

/// Execute settings commands
pub async fn execute(args: &SettingsArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        SettingsCommand::Get { module, key } => {
            let settings = app.registry_of(module)?.settings(module)?;
            let mut names: Vec<String> =
                settings.schema().iter().map(|(k, _)| k.to_string()).collect();
            for stored in settings.all().keys() {
                if !names.contains(stored) {
                    names.push(stored.clone());
                }
            }
            if let Some(key) = key {
                names.retain(|k| k == key);
            }

            let rows: Vec<SettingRow> = names
                .into_iter()
                .map(|k| SettingRow {
                    value: display(settings.get(&k, None)),
                    default: display(settings.schema().get(&k).and_then(|d| d.default_value())),
                    key: k,
                })
                .collect();
            output::print_list(&rows, format);
        }
        SettingsCommand::Set { module, key, value } => {
            let settings = app.registry_of(module)?.settings(module)?;
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            settings.set(key, value).await?;
            output::print_success(&format!("{module}.{key} updated"));
        }
        SettingsCommand::Export { output: path } => {
            let ids = app.module_ids();
            let data = backup::export(
                &app.store,
                ids.iter().map(String::as_str),
                env!("CARGO_PKG_VERSION"),
            )
            .await?;
            let json = serde_json::to_string_pretty(&data)?;

            match path {
                Some(path) => {
                    tokio::fs::write(path, json).await?;
                    output::print_success(&format!("Backup written to '{}'", path.display()));
                }
                None => println!("{json}"),
            }
        }
        SettingsCommand::Import { file } => {
            let raw = tokio::fs::read_to_string(file).await?;
            let meta = backup::import(&app.store, backup::parse_backup(&raw)?).await?;
            output::print_success(&format!(
                "Restored backup from version {} created {}",
                meta.version, meta.created_at
            ));
        }
        SettingsCommand::Reset { yes } => {
            let confirmed = *yes
                || dialoguer::Confirm::new()
                    .with_prompt("Delete all settings and module states?")
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
            if !confirmed {
                output::print_warning("Reset cancelled");
                return Ok(());
            }
            app.store.clear().await?;
            output::print_success("Settings reset");
        }
        SettingsCommand::Verbose { enabled } => {
            app.store.set(keys::VERBOSE_LOGGING, Value::Bool(*enabled)).await?;
            output::print_success(&format!(
                "Verbose logging {}",
                if *enabled { "on" } else { "off" }
            ));
        }
        SettingsCommand::Token { token: Some(token) } => {
            app.store.set(keys::API_TOKEN, Value::String(token.clone())).await?;
            output::print_success("Access token stored");
        }
        SettingsCommand::Token { token: None } => {
            app.store.remove(keys::API_TOKEN).await?;
            output::print_success("Access token removed");
        }
    }

    Ok(())
}

fn display(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
