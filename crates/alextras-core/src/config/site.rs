//! Augmented site host names.

use serde::{Deserialize, Serialize};

/// Host names used to decide which site-surface a page belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Host of the client-routed primary site.
    #[serde(default = "default_primary_host")]
    pub primary_host: String,
    /// Host of the fully-reloaded secondary site.
    #[serde(default = "default_secondary_host")]
    pub secondary_host: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            primary_host: default_primary_host(),
            secondary_host: default_secondary_host(),
        }
    }
}

fn default_primary_host() -> String {
    "anilist.co".to_string()
}

fn default_secondary_host() -> String {
    "myanimelist.net".to_string()
}
