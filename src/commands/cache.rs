//! Expiring cache CLI commands.

use clap::{Args, Subcommand};

use alextras::App;
use alextras_core::AppResult;
use alextras_core::traits::ExpiringCache;

use crate::output;

/// Arguments for cache commands
#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Cache subcommand
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Clear cached lookups
    Clear {
        /// Only clear one store, e.g. `ids-map-ANIME`
        #[arg(short, long)]
        store: Option<String>,
    },
}

/// Execute cache commands
pub async fn execute(args: &CacheArgs, app: &App) -> AppResult<()> {
    match &args.command {
        CacheCommand::Clear { store: Some(store) } => {
            app.cache.clear(store).await?;
            output::print_success(&format!("Cache store '{store}' cleared"));
        }
        CacheCommand::Clear { store: None } => {
            app.cache.drop_all().await?;
            output::print_success("Cache cleared");
        }
    }

    Ok(())
}
