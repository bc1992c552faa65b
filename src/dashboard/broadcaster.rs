//! Fan-out of status snapshots to connected observers.

use super::types::WebSocketUpdate;
use crate::health::StatusSnapshot;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Identifies one connected observer.
pub type ObserverId = Uuid;

/// Why a snapshot could not be turned into a push message.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to serialize status update: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("status update is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Outcome of one [`Broadcaster::broadcast`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Observers the message was queued for
    pub delivered: usize,
    /// Observers removed because they were closed or could not keep up
    pub dropped: usize,
    /// The message was not sent to anyone
    pub skipped: bool,
}

/// Receiving side of one observer's queue.
///
/// Dropping it closes the observer; the next broadcast removes it.
pub struct ObserverHandle {
    id: ObserverId,
    rx: mpsc::Receiver<Arc<str>>,
}

impl ObserverHandle {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Next encoded message, or `None` once the observer was dropped.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.rx.try_recv().ok()
    }
}

struct ObserverSlot {
    tx: mpsc::Sender<Arc<str>>,
    /// Newest `lastCheckedAt` queued to this observer
    last_checked_at: Option<DateTime<Utc>>,
}

/// Pushes every new snapshot to all open observers.
///
/// An observer is open from [`register`](Self::register) until
/// [`unregister`](Self::unregister), or until a broadcast finds its queue
/// closed or full. Each observer gets its own bounded queue, so one slow
/// connection can never hold up delivery to the others. An observer never
/// receives a snapshot older than one it was already sent.
pub struct Broadcaster {
    observers: DashMap<ObserverId, ObserverSlot>,
    queue_capacity: usize,
    max_message_bytes: usize,
}

impl Broadcaster {
    pub fn new(queue_capacity: usize, max_message_bytes: usize) -> Self {
        Self {
            observers: DashMap::new(),
            queue_capacity: queue_capacity.max(1),
            max_message_bytes,
        }
    }

    /// Encode a snapshot as a push message, enforcing the size cap.
    pub fn encode(&self, snapshot: &StatusSnapshot) -> Result<Arc<str>, BroadcastError> {
        let json = serde_json::to_string(&WebSocketUpdate::status(snapshot)?)?;
        if json.len() > self.max_message_bytes {
            return Err(BroadcastError::TooLarge {
                size: json.len(),
                limit: self.max_message_bytes,
            });
        }
        Ok(json.into())
    }

    /// Open a new observer whose first message is `initial`.
    ///
    /// The initial message is queued before the observer joins the fan-out,
    /// so it always precedes any broadcast the observer receives.
    pub fn register(&self, initial: &StatusSnapshot) -> ObserverHandle {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = Uuid::new_v4();

        let last_checked_at = match self.encode(initial) {
            Ok(message) => {
                // Fresh queue with capacity >= 1 always has room
                let _ = tx.try_send(message);
                initial.checked_at()
            }
            Err(e) => {
                tracing::warn!(observer_id = %id, error = %e, "Skipping initial snapshot");
                None
            }
        };

        self.observers.insert(id, ObserverSlot { tx, last_checked_at });
        tracing::info!(
            observer_id = %id,
            observers = self.observers.len(),
            "Observer connected"
        );

        ObserverHandle { id, rx }
    }

    /// Close an observer. Returns false if it was already gone.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.remove(&id).is_some();
        if removed {
            tracing::info!(
                observer_id = %id,
                observers = self.observers.len(),
                "Observer disconnected"
            );
        }
        removed
    }

    pub fn is_open(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Queue `snapshot` for every open observer.
    ///
    /// Never blocks. Observers whose queue is closed or full are removed;
    /// oversized messages are skipped entirely. Observers already holding a
    /// newer snapshot are passed over.
    pub fn broadcast(&self, snapshot: &StatusSnapshot) -> BroadcastReport {
        let message = match self.encode(snapshot) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping status broadcast");
                return BroadcastReport {
                    skipped: true,
                    ..Default::default()
                };
            }
        };

        let checked_at = snapshot.checked_at();
        let mut report = BroadcastReport::default();
        let mut stale = Vec::new();

        for mut entry in self.observers.iter_mut() {
            let id = *entry.key();
            let slot = entry.value_mut();

            if let (Some(new), Some(last)) = (checked_at, slot.last_checked_at) {
                if new < last {
                    tracing::debug!(observer_id = %id, "Observer already has a newer snapshot");
                    continue;
                }
            }

            match slot.tx.try_send(Arc::clone(&message)) {
                Ok(()) => {
                    report.delivered += 1;
                    if checked_at.is_some() {
                        slot.last_checked_at = checked_at;
                    }
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(observer_id = %id, "Observer queue full, disconnecting");
                    stale.push(id);
                }
                Err(TrySendError::Closed(_)) => stale.push(id),
            }
        }

        // Removal happens after iteration; removing under a DashMap iterator deadlocks
        for id in stale {
            if self.observers.remove(&id).is_some() {
                report.dropped += 1;
                tracing::debug!(observer_id = %id, "Dropped observer");
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceDescriptor;
    use crate::health::{ContainerState, HealthRecord};

    fn snapshot(ids: &[&str]) -> StatusSnapshot {
        snapshot_at(ids, chrono::Utc::now())
    }

    fn snapshot_at(ids: &[&str], checked_at: DateTime<Utc>) -> StatusSnapshot {
        ids.iter()
            .map(|id| {
                HealthRecord::new(
                    ServiceDescriptor::new(*id, *id, 8554, *id),
                    ContainerState::not_found(),
                    false,
                    checked_at,
                )
            })
            .collect()
    }

    fn decode(message: &str) -> StatusSnapshot {
        serde_json::from_str::<WebSocketUpdate>(message)
            .unwrap()
            .into_snapshot()
            .unwrap()
    }

    #[tokio::test]
    async fn test_initial_snapshot_arrives_first() {
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        let mut observer = broadcaster.register(&snapshot(&["initial"]));
        broadcaster.broadcast(&snapshot(&["later"]));

        let first = decode(&observer.recv().await.unwrap());
        let second = decode(&observer.recv().await.unwrap());
        assert!(first.get("initial").is_some());
        assert!(second.get("later").is_some());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_observer() {
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        let mut a = broadcaster.register(&StatusSnapshot::new());
        let mut b = broadcaster.register(&StatusSnapshot::new());
        a.recv().await.unwrap();
        b.recv().await.unwrap();

        let report = broadcaster.broadcast(&snapshot(&["rtsp-server"]));

        assert_eq!(report.delivered, 2);
        assert_eq!(report.dropped, 0);
        assert_eq!(a.recv().await.unwrap(), b.recv().await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_observer_is_removed_without_affecting_others() {
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        let gone = broadcaster.register(&StatusSnapshot::new());
        let gone_id = gone.id();
        let mut alive = broadcaster.register(&StatusSnapshot::new());
        drop(gone);

        let report = broadcaster.broadcast(&snapshot(&["a"]));

        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
        assert!(!broadcaster.is_open(gone_id));
        assert_eq!(broadcaster.observer_count(), 1);
        alive.recv().await.unwrap();
        assert!(decode(&alive.recv().await.unwrap()).get("a").is_some());
    }

    #[test]
    fn test_full_queue_drops_slow_observer() {
        let broadcaster = Broadcaster::new(2, 64 * 1024);
        let slow = broadcaster.register(&StatusSnapshot::new());

        // Initial message plus one broadcast fill the queue
        assert_eq!(broadcaster.broadcast(&snapshot(&["a"])).delivered, 1);
        let report = broadcaster.broadcast(&snapshot(&["b"]));

        assert_eq!(report.dropped, 1);
        assert!(!broadcaster.is_open(slow.id()));
    }

    #[test]
    fn test_oversized_snapshot_is_skipped() {
        let broadcaster = Broadcaster::new(4, 64);
        let mut observer = broadcaster.register(&StatusSnapshot::new());
        observer.try_recv().unwrap();

        let report = broadcaster.broadcast(&snapshot(&["rtsp-server", "rtsp-to-srt"]));

        assert!(report.skipped);
        assert!(observer.try_recv().is_none());
        assert!(broadcaster.is_open(observer.id()));
    }

    #[test]
    fn test_older_snapshot_never_follows_newer_one() {
        let now = chrono::Utc::now();
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        let mut observer = broadcaster.register(&snapshot_at(&["a"], now));
        observer.try_recv().unwrap();

        // A cycle that began before the observer's own snapshot finishes late
        let report = broadcaster.broadcast(&snapshot_at(&["a"], now - chrono::Duration::seconds(5)));
        assert_eq!(report.delivered, 0);
        assert_eq!(report.dropped, 0);
        assert!(observer.try_recv().is_none());
        assert!(broadcaster.is_open(observer.id()));

        let newer = now + chrono::Duration::seconds(5);
        assert_eq!(broadcaster.broadcast(&snapshot_at(&["a"], newer)).delivered, 1);
        let received = decode(&observer.try_recv().unwrap());
        assert_eq!(received.checked_at(), Some(newer));
    }

    #[test]
    fn test_broadcast_with_no_observers() {
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        assert_eq!(broadcaster.broadcast(&snapshot(&["a"])), BroadcastReport::default());
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let broadcaster = Broadcaster::new(4, 64 * 1024);
        let observer = broadcaster.register(&StatusSnapshot::new());

        assert!(broadcaster.unregister(observer.id()));
        assert!(!broadcaster.unregister(observer.id()));
        assert_eq!(broadcaster.observer_count(), 0);
    }
}
