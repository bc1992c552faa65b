//! Watch command implementation
//!
//! Follows the monitor's push channel and prints every snapshot. The
//! connection is re-established forever with capped exponential backoff.

use crate::cli::output::{format_status_table, format_summary};
use crate::cli::WatchArgs;
use crate::dashboard::WebSocketUpdate;
use crate::health::StatusSnapshot;
use futures::StreamExt;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Double the delay, capped at 10s.
pub fn next_backoff(current: Duration) -> Duration {
    let next = current + current;
    if next > MAX_BACKOFF {
        MAX_BACKOFF
    } else {
        next
    }
}

/// Push channel URL for a monitor base URL.
pub fn websocket_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", base)
}

/// Decode one push message. Returns `None` for anything that is not a
/// status update.
pub fn parse_update(text: &str) -> Option<StatusSnapshot> {
    serde_json::from_str::<WebSocketUpdate>(text)
        .ok()?
        .into_snapshot()
}

fn render(snapshot: &StatusSnapshot, json: bool) -> String {
    if json {
        serde_json::to_string(snapshot).unwrap_or_default()
    } else {
        format!(
            "{}\n{}\n",
            format_status_table(snapshot),
            format_summary(snapshot)
        )
    }
}

/// Run one connection until it closes. Fails only if it never connected.
async fn follow(url: &str, json: bool) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let (mut ws, _) = connect_async(url).await?;
    eprintln!("Connected to {}", url);

    while let Some(message) = ws.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                eprintln!("Connection lost: {}", e);
                break;
            }
        };
        match message {
            Message::Text(text) => match parse_update(&text) {
                Some(snapshot) => println!("{}", render(&snapshot, json)),
                None => tracing::debug!("Ignoring unrecognized push message"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}

/// Handle `paladium watch` command. Returns only on Ctrl+C.
pub async fn handle_watch(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = websocket_url(&args.url);
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let attempt = tokio::select! {
            result = follow(&url, args.json) => result,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };

        match attempt {
            // A session that connected resets the delay
            Ok(()) => {
                backoff = INITIAL_BACKOFF;
                eprintln!("Connection closed, reconnecting in {}s", backoff.as_secs());
            }
            Err(e) => {
                eprintln!("Connection failed: {}. Retrying in {}s", e, backoff.as_secs());
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        backoff = next_backoff(backoff);
    }
}
