//! Container runtime connection configuration

use serde::{Deserialize, Serialize};

/// How to reach the Docker daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Socket path or `tcp://host:port`. `None` uses the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_host: Option<String>,
    /// Timeout applied by the runtime client to every request
    pub timeout_seconds: u64,
    /// Upper bound for `?lines=` on log requests
    pub max_log_lines: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            docker_host: None,
            timeout_seconds: 10,
            max_log_lines: 1000,
        }
    }
}
