//! HTTP handlers for the health endpoint.

use axum::extract::{Json, State};

use crate::adapters::websocket::Hub;

use super::dto::HealthResponse;

/// GET /health - Liveness plus connected client count
pub async fn health(State(hub): State<Hub>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(hub.live_count()))
}
