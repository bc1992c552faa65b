//! Remote control configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Allow start/stop commands from the dashboard
    pub enabled: bool,
    /// Delay before the status re-poll that follows a control command
    pub repoll_delay_seconds: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repoll_delay_seconds: 2,
        }
    }
}
