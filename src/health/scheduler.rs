//! Periodic poll driving aggregation and broadcast.

use super::StatusAggregator;
use crate::dashboard::{BroadcastReport, Broadcaster};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Requests an out-of-band poll from a running [`PollScheduler`].
///
/// Requests made while a cycle is running are coalesced into one extra cycle.
#[derive(Debug, Clone, Default)]
pub struct PollTrigger {
    notify: Arc<Notify>,
}

impl PollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_now(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// Background task: every `interval`, refresh the aggregator and push the
/// result to all observers.
///
/// Cycles run inline in the scheduler loop, so they never overlap. A cycle
/// that outlasts the interval delays the next tick instead of queuing a burst.
pub struct PollScheduler {
    aggregator: Arc<StatusAggregator>,
    broadcaster: Arc<Broadcaster>,
    interval: Duration,
    trigger: PollTrigger,
}

impl PollScheduler {
    pub fn new(
        aggregator: Arc<StatusAggregator>,
        broadcaster: Arc<Broadcaster>,
        interval: Duration,
    ) -> Self {
        Self {
            aggregator,
            broadcaster,
            interval,
            trigger: PollTrigger::new(),
        }
    }

    /// Share a trigger created elsewhere (e.g. by the control dispatcher).
    pub fn with_trigger(mut self, trigger: PollTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn trigger(&self) -> PollTrigger {
        self.trigger.clone()
    }

    /// Run one aggregation cycle and broadcast the result.
    pub async fn run_cycle(&self) -> BroadcastReport {
        let started = Instant::now();
        let snapshot = self.aggregator.refresh().await;
        let report = self.broadcaster.broadcast(&snapshot);
        let elapsed = started.elapsed();
        crate::metrics::record_cycle(&snapshot, &report, elapsed);

        tracing::debug!(
            services = snapshot.len(),
            delivered = report.delivered,
            dropped = report.dropped,
            duration_ms = elapsed.as_millis() as u64,
            "Poll cycle completed"
        );
        report
    }

    /// Start the scheduler. The first cycle runs immediately.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_seconds = self.interval.as_secs_f64(),
                services = self.aggregator.services().len(),
                "Poll scheduler started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Poll scheduler shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.run_cycle().await;
                    }
                    _ = self.trigger.requested() => {
                        tracing::debug!("Out-of-band poll requested");
                        self.run_cycle().await;
                        interval.reset();
                    }
                }
            }
        })
    }
}
