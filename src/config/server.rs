//! HTTP and push-channel server configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Status messages larger than this are not pushed to observers
    pub max_message_bytes: usize,
    /// Per-observer queue depth; a full queue drops the observer
    pub observer_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_message_bytes: 64 * 1024,
            observer_queue_capacity: 16,
        }
    }
}
