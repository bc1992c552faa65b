//! WebSocket handler for real-time dashboard updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::api::AppState;
use crate::config::MonitorConfig;
use crate::health::StatusSnapshot;

/// Handles WebSocket upgrade requests for dashboard real-time updates
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Longest a connecting observer waits for the scheduler's first publish:
/// one interval plus the worst-case cycle (runtime probe, then port probe).
pub(crate) fn first_publish_wait(config: &MonitorConfig) -> Duration {
    config.health_check.interval()
        + Duration::from_secs(config.runtime.timeout_seconds)
        + config.health_check.probe_timeout()
}

/// Snapshot sent to a newly opened observer.
///
/// Prefers the published one. Before the first poll completes, waits for it
/// up to [`first_publish_wait`], then computes one without publishing it.
pub(crate) async fn initial_snapshot(state: &AppState) -> Arc<StatusSnapshot> {
    if let Some(snapshot) = state.aggregator.current() {
        return snapshot;
    }

    if state.config.health_check.enabled {
        let wait = first_publish_wait(&state.config);
        if let Ok(Some(snapshot)) =
            tokio::time::timeout(wait, state.aggregator.wait_for_current()).await
        {
            return snapshot;
        }
    }

    Arc::new(state.aggregator.compute_snapshot().await)
}

/// Handles an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let initial = initial_snapshot(&state).await;
    let mut observer = state.broadcaster.register(&initial);
    let observer_id = observer.id();

    let (mut sender, mut receiver) = socket.split();

    // Forward queued status messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = observer.recv().await {
            if sender.send(Message::Text(message.to_string())).await.is_err() {
                break;
            }
        }
    });

    // Observers never send anything meaningful; watch for close only
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.broadcaster.unregister(observer_id);
}
