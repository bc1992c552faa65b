//! Real-time dashboard push channel
//!
//! Observers connect over WebSocket at `/ws`. Each one receives the current
//! status snapshot as soon as it connects, followed by every snapshot the
//! poll scheduler produces while it stays connected:
//!
//! ```json
//! {"type": "status", "data": {"rtsp-server": {...}, "rtsp-to-srt": {...}}}
//! ```

pub mod broadcaster;
pub mod types;
pub mod websocket;

pub use broadcaster::{BroadcastError, BroadcastReport, Broadcaster, ObserverHandle, ObserverId};
pub use types::{UpdateType, WebSocketUpdate};
pub use websocket::websocket_handler;
