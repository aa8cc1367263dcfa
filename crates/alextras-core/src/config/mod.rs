//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty file is valid.

pub mod api;
pub mod cache;
pub mod loader;
pub mod logging;
pub mod site;
pub mod store;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::cache::CacheConfig;
use self::loader::LoaderConfig;
use self::logging::LoggingConfig;
use self::site::SiteConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host names of the two augmented sites.
    #[serde(default)]
    pub site: SiteConfig,
    /// Expiring cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Persistent key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Remote API endpoints and retry policy.
    #[serde(default)]
    pub api: ApiConfig,
    /// Module lifecycle timing settings.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `ALEXTRAS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(directory: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{directory}/default")).required(false))
            .add_source(config::File::with_name(&format!("{directory}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ALEXTRAS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
