use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the models failed to load.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub models_loaded: bool,
    pub dataset_loaded: bool,
}

/// GET /health -- returns service and model health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models_loaded = state.models.is_ready();
    let status = if models_loaded { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        models_loaded,
        dataset_loaded: state.dataset.is_ready(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
