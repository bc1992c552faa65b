//! # Metrics Collection Module
//!
//! Prometheus export of poll, fan-out and control activity, served at
//! `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `paladium_poll_cycles_total` - Completed poll cycles
//! - `paladium_probe_failures_total{service}` - Records whose runtime probe failed
//! - `paladium_broadcast_messages_total{outcome}` - Snapshot messages queued
//!   (`delivered`) or lost with a removed observer (`dropped`)
//! - `paladium_broadcast_skipped_total` - Snapshots over the message size cap
//! - `paladium_control_commands_total{action, outcome}` - Start/stop commands
//!
//! **Histograms:**
//! - `paladium_poll_cycle_duration_seconds` - Aggregation plus fan-out time
//!
//! **Gauges:**
//! - `paladium_services{overall}` - Services per overall status in the latest snapshot
//! - `paladium_observers` - Connected push-channel observers
//! - `paladium_uptime_seconds` - Monitor uptime

pub mod handler;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::control::{ControlAction, ControlError};
use crate::dashboard::{BroadcastReport, Broadcaster};
use crate::health::{OverallStatus, StatusAggregator, StatusSnapshot};
use metrics_exporter_prometheus::{Matcher, PrometheusHandle};
use std::sync::Arc;
use std::time::{Duration, Instant};

const OVERALL_LABELS: [(OverallStatus, &str); 4] = [
    (OverallStatus::Healthy, "healthy"),
    (OverallStatus::Unhealthy, "unhealthy"),
    (OverallStatus::NotFound, "not_found"),
    (OverallStatus::Error, "error"),
];

/// Computes gauges from live state and renders the Prometheus text.
pub struct MetricsCollector {
    aggregator: Arc<StatusAggregator>,
    broadcaster: Arc<Broadcaster>,
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        aggregator: Arc<StatusAggregator>,
        broadcaster: Arc<Broadcaster>,
        start_time: Instant,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            aggregator,
            broadcaster,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh gauges that are read from state rather than recorded on events.
    pub fn update_gauges(&self) {
        metrics::gauge!("paladium_observers").set(self.broadcaster.observer_count() as f64);
        metrics::gauge!("paladium_uptime_seconds").set(self.uptime_seconds() as f64);
        if let Some(snapshot) = self.aggregator.current() {
            record_service_gauges(&snapshot);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Cycle durations are bounded by the runtime timeout plus the reachability
/// timeout, so buckets stop at 30 seconds.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let cycle_buckets = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("paladium_poll_cycle_duration_seconds".to_string()),
            cycle_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Set `paladium_services{overall}` from one snapshot.
pub fn record_service_gauges(snapshot: &StatusSnapshot) {
    for (status, label) in OVERALL_LABELS {
        metrics::gauge!("paladium_services", "overall" => label).set(snapshot.count(status) as f64);
    }
}

/// Record one completed poll cycle.
pub fn record_cycle(snapshot: &StatusSnapshot, report: &BroadcastReport, elapsed: Duration) {
    metrics::counter!("paladium_poll_cycles_total").increment(1);
    metrics::histogram!("paladium_poll_cycle_duration_seconds").record(elapsed.as_secs_f64());

    metrics::counter!("paladium_broadcast_messages_total", "outcome" => "delivered")
        .increment(report.delivered as u64);
    metrics::counter!("paladium_broadcast_messages_total", "outcome" => "dropped")
        .increment(report.dropped as u64);
    if report.skipped {
        metrics::counter!("paladium_broadcast_skipped_total").increment(1);
    }

    for record in snapshot
        .records()
        .filter(|r| r.overall == OverallStatus::Error)
    {
        metrics::counter!(
            "paladium_probe_failures_total",
            "service" => record.descriptor.id.clone()
        )
        .increment(1);
    }

    record_service_gauges(snapshot);
}

/// Record the outcome of one control command.
pub fn record_control(action: ControlAction, result: &Result<(), ControlError>) {
    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::counter!(
        "paladium_control_commands_total",
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
