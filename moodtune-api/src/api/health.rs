//! Health check endpoints
//!
//! Answered without touching credentials or the catalog.

use axum::{extract::State, routing::get, Json, Router};
use moodtune_common::api::HealthResponse;

use crate::AppState;

/// Service name reported by health checks
pub const SERVICE_NAME: &str = "moodtune-api";

/// GET /health, GET /api/py/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/py/health", get(health_check))
}
