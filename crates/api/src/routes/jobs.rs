//! Route definitions for reading result files.

use axum::routing::get;
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// GET    /jobs/{filename}    -> get_job_file
/// GET    /api/jobs           -> latest_jobs
/// GET    /api/files          -> list_files
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs/{filename}", get(jobs::get_job_file))
        .route("/api/jobs", get(jobs::latest_jobs))
        .route("/api/files", get(jobs::list_files))
}
