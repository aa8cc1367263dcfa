//! Expiring cache configuration.

use serde::{Deserialize, Serialize};

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"disk"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Directory holding one JSON file per store (disk provider only).
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Maximum number of entries kept in memory.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            directory: default_directory(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_directory() -> String {
    "data/cache".to_string()
}

fn default_max_capacity() -> u64 {
    10_000
}
