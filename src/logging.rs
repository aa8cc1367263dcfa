//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use alextras_core::config::logging::LoggingConfig;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over the configured level. `verbose` (the persisted
/// `verboseLogging` toggle) raises the configured level to `debug`.
/// Output goes to stderr so command output stays machine-readable.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
