//! CLI command definitions and dispatch.

pub mod cache;
pub mod modules;
pub mod resolve;
pub mod settings;
pub mod visit;
pub mod watch;

use clap::{Parser, Subcommand};

use alextras::App;
use alextras_core::AppResult;

use crate::output::OutputFormat;

/// AniList Extras: page-enhancement modules for AniList and MyAnimeList
#[derive(Debug, Parser)]
#[command(name = "alextras", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay merged over the defaults
    #[arg(short, long, default_value = "development")]
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
    /// Follow AniList navigation, one URL per line on stdin
    Watch(watch::WatchArgs),
    /// Load the modules of a single page
    Visit(visit::VisitArgs),
    /// Module management
    Modules(modules::ModulesArgs),
    /// Settings, backup and restore
    Settings(settings::SettingsArgs),
    /// Expiring cache maintenance
    Cache(cache::CacheArgs),
    /// Cross-site id lookup
    Resolve(resolve::ResolveArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app: &App) -> AppResult<()> {
        match &self.command {
            Commands::Watch(args) => watch::execute(args, app, self.format).await,
            Commands::Visit(args) => visit::execute(args, app, self.format).await,
            Commands::Modules(args) => modules::execute(args, app, self.format).await,
            Commands::Settings(args) => settings::execute(args, app, self.format).await,
            Commands::Cache(args) => cache::execute(args, app).await,
            Commands::Resolve(args) => resolve::execute(args, app, self.format).await,
        }
    }
}
