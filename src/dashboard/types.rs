//! Type definitions for dashboard push messages

use crate::health::StatusSnapshot;
use serde::{Deserialize, Serialize};

/// WebSocket update message sent to dashboard observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketUpdate {
    /// Type of update
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    /// JSON payload for the update
    pub data: serde_json::Value,
}

/// Type of WebSocket update
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// Full status snapshot for every service
    Status,
}

impl WebSocketUpdate {
    /// Wrap a snapshot as a `{"type":"status","data":{...}}` message.
    pub fn status(snapshot: &StatusSnapshot) -> Result<Self, serde_json::Error> {
        Ok(Self {
            update_type: UpdateType::Status,
            data: serde_json::to_value(snapshot)?,
        })
    }

    /// Decode the payload of a status update.
    pub fn into_snapshot(self) -> Option<StatusSnapshot> {
        match self.update_type {
            UpdateType::Status => serde_json::from_value(self.data).ok(),
        }
    }
}
