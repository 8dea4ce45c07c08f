pub mod health;
pub mod jobs;
pub mod scraper;
pub mod ui;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (everything except `/health`).
///
/// Route hierarchy:
///
/// ```text
/// /                          index page (?file=, ?error=)
/// /static/app.js             browser poller
///
/// /jobs/{filename}           one result file with display name
/// /api/jobs                  records of the latest result file
/// /api/files                 result files, most recent first
///
/// /run-scraper               trigger a scrape (POST, JSON or form)
/// /api/scraper/status        scrape lifecycle snapshot
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(ui::router())
        .merge(jobs::router())
        .merge(scraper::router())
}
