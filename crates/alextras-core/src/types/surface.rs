//! Site-surfaces augmented by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::site::SiteConfig;

/// One of the two websites the engine augments.
///
/// Each surface owns its own module registry and navigation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteSurface {
    /// Client-routed single-page application (anilist.co).
    Primary,
    /// Site that fully reloads on every navigation (myanimelist.net).
    Secondary,
}

impl SiteSurface {
    /// Returns the string name of this surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "anilist",
            Self::Secondary => "mal",
        }
    }

    /// Whether modules on this surface are ever torn down in place.
    ///
    /// The secondary site rebuilds its document on every navigation, so
    /// unload is never invoked there.
    pub fn supports_unload(&self) -> bool {
        matches!(self, Self::Primary)
    }

    /// Pick the surface a host belongs to.
    pub fn from_host(host: &str, sites: &SiteConfig) -> Option<Self> {
        let host = host.trim_start_matches("www.");
        if host == sites.primary_host {
            Some(Self::Primary)
        } else if host == sites.secondary_host {
            Some(Self::Secondary)
        } else {
            None
        }
    }
}

impl fmt::Display for SiteSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
