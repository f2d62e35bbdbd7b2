use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Version label of the loaded card layout.
    pub layout_version: Option<String>,
}

/// GET /health -- liveness of the service itself; the PAD service is not contacted.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        layout_version: state.layout.version().map(str::to_string),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api-ld/v3`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
