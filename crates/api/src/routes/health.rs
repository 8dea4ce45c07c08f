use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the output directory can be listed.
    pub output_dir_readable: bool,
    /// Current scrape lifecycle state (`idle`, `running`, ...).
    pub scraper: &'static str,
}

/// GET /health -- returns service and result store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let output_dir_readable = state.store.health_check().await.is_ok();

    let status = if output_dir_readable { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        output_dir_readable,
        scraper: state.supervisor.status().await.label(),
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
