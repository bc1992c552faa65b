//! Service status aggregation.
//!
//! This module turns runtime and network probes into one [`HealthRecord`]
//! per configured service, and drives the periodic poll that keeps the
//! current [`StatusSnapshot`] fresh.

mod config;
mod error;
mod reachability;
mod scheduler;
mod state;


pub use config::*;
pub use error::*;
pub use reachability::ReachabilityProbe;
pub use scheduler::{PollScheduler, PollTrigger};
pub use state::*;

use crate::config::ServiceDescriptor;
use crate::runtime::RuntimeStatusProbe;
use std::sync::Arc;
use tokio::sync::watch;

/// Builds status snapshots and holds the current one.
///
/// Only [`StatusAggregator::refresh`] replaces the current snapshot, and the
/// poll scheduler is its only caller. Readers get an `Arc` to an immutable
/// snapshot, so they always see either the previous or the new value whole.
pub struct StatusAggregator {
    services: Arc<[ServiceDescriptor]>,
    runtime_probe: RuntimeStatusProbe,
    reachability: ReachabilityProbe,
    current: watch::Sender<Option<Arc<StatusSnapshot>>>,
}

impl StatusAggregator {
    pub fn new(
        services: Arc<[ServiceDescriptor]>,
        runtime_probe: RuntimeStatusProbe,
        reachability: ReachabilityProbe,
    ) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            services,
            runtime_probe,
            reachability,
            current,
        }
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Check one service. Probe failures become an `error` container state.
    pub async fn check_service(&self, descriptor: &ServiceDescriptor) -> HealthRecord {
        check_service(&self.runtime_probe, &self.reachability, descriptor).await
    }

    /// Probe every configured service concurrently.
    ///
    /// Always returns one record per service. Each check runs on its own task,
    /// so a slow probe only delays its own record and a panicking probe only
    /// turns its own record into an `error`.
    pub async fn compute_snapshot(&self) -> StatusSnapshot {
        let handles: Vec<_> = self
            .services
            .iter()
            .cloned()
            .map(|descriptor| {
                let runtime_probe = self.runtime_probe.clone();
                let reachability = self.reachability.clone();
                tokio::spawn(async move {
                    check_service(&runtime_probe, &reachability, &descriptor).await
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        self.services
            .iter()
            .zip(results)
            .map(|(descriptor, result)| match result {
                Ok(record) => record,
                Err(e) => {
                    let error = ProbeError::TaskFailed(e.to_string());
                    tracing::error!(
                        service_id = %descriptor.id,
                        error = %error,
                        "Status check task failed"
                    );
                    HealthRecord::new(
                        descriptor.clone(),
                        ContainerState::error(error.to_string()),
                        false,
                        chrono::Utc::now(),
                    )
                }
            })
            .collect()
    }

    /// Compute a fresh snapshot and make it the current one.
    pub async fn refresh(&self) -> Arc<StatusSnapshot> {
        let snapshot = Arc::new(self.compute_snapshot().await);
        self.current.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// The latest published snapshot, if a cycle has completed yet.
    pub fn current(&self) -> Option<Arc<StatusSnapshot>> {
        self.current.borrow().clone()
    }

    /// Wait until the first snapshot has been published.
    pub async fn wait_for_current(&self) -> Option<Arc<StatusSnapshot>> {
        let mut rx = self.current.subscribe();
        let published = rx.wait_for(Option::is_some).await.ok()?;
        published.clone()
    }
}

async fn check_service(
    runtime_probe: &RuntimeStatusProbe,
    reachability: &ReachabilityProbe,
    descriptor: &ServiceDescriptor,
) -> HealthRecord {
    let container = match runtime_probe.probe(&descriptor.container_name).await {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(
                service_id = %descriptor.id,
                container = %descriptor.container_name,
                error = %e,
                "Runtime probe failed"
            );
            ContainerState::error(e.to_string())
        }
    };

    // RTSP/SRT endpoints do not answer HTTP, so a running container counts
    // as reachable without a port probe.
    let reachable = match container.status {
        ContainerStatus::Running => true,
        _ => reachability.is_reachable(descriptor.port).await,
    };

    let record = HealthRecord::new(descriptor.clone(), container, reachable, chrono::Utc::now());
    tracing::debug!(
        service_id = %descriptor.id,
        overall = ?record.overall,
        reachable,
        "Service checked"
    );
    record
}
