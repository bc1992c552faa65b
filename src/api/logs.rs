//! Container log tail endpoint.

use super::{ApiError, AppState};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

/// GET /api/logs/:service?lines=N
///
/// A malformed `lines` value is a 400 with the usual `{error}` body.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(query) = query?;
    let logs = state.log_fetcher.fetch(&service_id, query.lines).await?;
    Ok(Json(LogsResponse { logs }))
}
