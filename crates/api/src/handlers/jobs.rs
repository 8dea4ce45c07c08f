//! Handlers for reading result files.

use axum::extract::{Path, State};
use axum::Json;
use jobscrape_core::job::JobRecord;
use jobscrape_core::wire::{FileListResponse, JobFileResponse};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /jobs/{filename}
///
/// Records of one result file together with its display name.
pub async fn get_job_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Json<JobFileResponse>> {
    let jobs = state.store.read_result_file(&filename).await?;
    tracing::debug!(file = %filename, job_count = jobs.len(), "Served result file");
    Ok(Json(JobFileResponse::new(filename, jobs)))
}

/// GET /api/jobs
///
/// Raw records of the latest result file; `[]` when there is none.
pub async fn latest_jobs(State(state): State<AppState>) -> AppResult<Json<Vec<JobRecord>>> {
    let jobs = state
        .store
        .read_latest()
        .await?
        .map(|(_, jobs)| jobs)
        .unwrap_or_default();
    Ok(Json(jobs))
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> AppResult<Json<FileListResponse>> {
    let files = state.store.list_result_files().await?;
    Ok(Json(FileListResponse::new(files)))
}
