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
    /// Number of projects in the local workspace.
    pub projects: usize,
    /// Number of channels polled in the background.
    pub watched_channels: usize,
}

/// GET /health -- returns service status and workspace size.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let projects = state.workspace.lock().await.projects().list().len();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        projects,
        watched_channels: state.chat_feeds.len(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
