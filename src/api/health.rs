//! Health check endpoint handler.

use crate::api::AppState;
use crate::health::{OverallStatus, StatusSnapshot};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub services: ServiceCounts,
    pub observers: usize,
}

/// Service counts per overall status in the current snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServiceCounts {
    pub total: usize,
    pub healthy: usize,
    /// Container present but not running
    pub unhealthy: usize,
    pub not_found: usize,
    /// Runtime probe failed
    pub error: usize,
}

fn summarize(snapshot: Option<&StatusSnapshot>) -> (&'static str, ServiceCounts) {
    let Some(snapshot) = snapshot else {
        return ("starting", ServiceCounts::default());
    };

    let total = snapshot.len();
    let healthy = snapshot.count(OverallStatus::Healthy);
    let status = match (healthy, total) {
        (h, t) if h == t && t > 0 => "healthy",
        (h, _) if h > 0 => "degraded",
        _ => "unhealthy",
    };

    (
        status,
        ServiceCounts {
            total,
            healthy,
            unhealthy: snapshot.count(OverallStatus::Unhealthy),
            not_found: snapshot.count(OverallStatus::NotFound),
            error: snapshot.count(OverallStatus::Error),
        },
    )
}

/// GET /health - Return monitor health from the current snapshot.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let current = state.aggregator.current();
    let (status, services) = summarize(current.as_deref());

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        services,
        observers: state.broadcaster.observer_count(),
    })
}
