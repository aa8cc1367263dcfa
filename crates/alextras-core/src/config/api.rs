//! Remote API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoints of the two remote content APIs and the shared retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// GraphQL endpoint of the primary site.
    #[serde(default = "default_anilist_url")]
    pub anilist_url: String,
    /// Base URL of the REST API mirroring the secondary site.
    #[serde(default = "default_jikan_url")]
    pub jikan_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Number of retries after the first attempt for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds; doubled per attempt.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Upper bound of a single backoff delay in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Longest server-requested `Retry-After` delay honoured, in seconds.
    #[serde(default = "default_max_retry_after")]
    pub max_retry_after_seconds: u64,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Backoff delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }

    /// Delay before retrying after a server asked to wait `requested`.
    pub fn retry_after(&self, requested: Duration) -> Duration {
        requested.min(Duration::from_secs(self.max_retry_after_seconds))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            anilist_url: default_anilist_url(),
            jikan_url: default_jikan_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            max_retry_after_seconds: default_max_retry_after(),
        }
    }
}

fn default_anilist_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_jikan_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    8_000
}

fn default_max_retry_after() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ApiConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(500));
        assert_eq!(config.backoff(2), Duration::from_millis(1_000));
        assert_eq!(config.backoff(3), Duration::from_millis(2_000));
        assert_eq!(config.backoff(10), Duration::from_millis(8_000));
    }

    #[test]
    fn test_retry_after_is_capped() {
        let config = ApiConfig::default();
        assert_eq!(config.retry_after(Duration::from_secs(2)), Duration::from_secs(2));
        assert_eq!(config.retry_after(Duration::from_secs(86_400)), Duration::from_secs(60));
    }
}
