//! Module lifecycle timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts used by wait primitives and dependency resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Default timeout of "wait until present" primitives, in milliseconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,
    /// Polling interval of predicate waits, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long a module waits for its dependencies to become active.
    #[serde(default = "default_dependency_timeout")]
    pub dependency_timeout_ms: u64,
}

impl LoaderConfig {
    /// Default wait timeout.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Predicate polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Dependency wait timeout.
    pub fn dependency_timeout(&self) -> Duration {
        Duration::from_millis(self.dependency_timeout_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout(),
            poll_interval_ms: default_poll_interval(),
            dependency_timeout_ms: default_dependency_timeout(),
        }
    }
}

fn default_wait_timeout() -> u64 {
    5_000
}

fn default_poll_interval() -> u64 {
    50
}

fn default_dependency_timeout() -> u64 {
    10_000
}
