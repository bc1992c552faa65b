//! Configured service listing.

use super::AppState;
use crate::config::ServiceDescriptor;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/services
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<Vec<ServiceDescriptor>> {
    Json(state.config.services.clone())
}
