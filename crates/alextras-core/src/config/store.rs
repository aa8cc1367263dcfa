//! Persistent key-value store configuration.

use serde::{Deserialize, Serialize};

/// Where and under which namespace the settings blob is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory containing the namespaced blob files.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Namespace of the blob; also its file stem.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            namespace: default_namespace(),
        }
    }
}

fn default_directory() -> String {
    "data/store".to_string()
}

fn default_namespace() -> String {
    "anilist-extras".to_string()
}
