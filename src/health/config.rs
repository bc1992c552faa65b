//! Configuration for status polling.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll cycle and probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the poll scheduler runs at all
    pub enabled: bool,
    /// Seconds between poll cycles
    pub interval_seconds: u64,
    /// Timeout for each TCP reachability probe
    pub probe_timeout_ms: u64,
    /// Host the reachability probe connects to
    pub probe_host: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 5,
            probe_timeout_ms: 3000,
            probe_host: "localhost".to_string(),
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
