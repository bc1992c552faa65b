//! Remote start/stop endpoint.

use super::{ApiError, AppState};
use crate::control::ControlAction;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a 202 response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlAccepted {
    pub service: String,
    pub action: ControlAction,
    pub status: String,
}

/// POST /api/control/:service/:action
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Path((service_id, action)): Path<(String, String)>,
) -> Result<(StatusCode, Json<ControlAccepted>), ApiError> {
    let action: ControlAction = action.parse()?;

    // The command task runs on its own; its outcome shows up in the next poll
    state.control.dispatch(&service_id, action)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ControlAccepted {
            service: service_id,
            action,
            status: "accepted".to_string(),
        }),
    ))
}
