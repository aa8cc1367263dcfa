//! AniList Extras command line.
//!
//! Loads configuration, opens the persistent store, initializes logging
//! and dispatches to a subcommand.

use clap::Parser;

use alextras::App;
use alextras::logging::init_logging;
use alextras_core::config::AppConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config, &cli.env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let app = match App::build(config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&app.config.logging, app.verbose_logging());
    tracing::debug!(env = %cli.env, version = env!("CARGO_PKG_VERSION"), "Starting");

    if let Err(e) = cli.execute(&app).await {
        tracing::debug!(kind = %e.kind, error = %e, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
