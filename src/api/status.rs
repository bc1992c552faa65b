//! Pull endpoint for the full status snapshot.

use super::{ApiError, AppState};
use crate::health::StatusSnapshot;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/status - Probe every service now and return the snapshot.
///
/// The result is not published; only the poll scheduler updates the
/// snapshot pushed to observers.
pub async fn handle(State(state): State<Arc<AppState>>) -> Result<Json<StatusSnapshot>, ApiError> {
    let aggregator = Arc::clone(&state.aggregator);
    let snapshot = tokio::spawn(async move { aggregator.compute_snapshot().await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Status aggregation failed");
            ApiError::internal(format!("failed to compute status: {}", e))
        })?;

    Ok(Json(snapshot))
}
