//! Route definitions for the scraper trigger and its status.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scraper;
use crate::state::AppState;

/// ```text
/// POST   /run-scraper           -> run_scraper
/// GET    /api/scraper/status    -> scraper_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run-scraper", post(scraper::run_scraper))
        .route("/api/scraper/status", get(scraper::scraper_status))
}
