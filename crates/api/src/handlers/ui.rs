//! Server-rendered page and the browser poller script.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{Html, IntoResponse};
use jobscrape_core::job::JobRecord;
use jobscrape_core::naming;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Browser-side poll session, served at `/static/app.js`.
const APP_JS: &str = include_str!("../../assets/app.js");

/// Query parameters understood by the index page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Result file to show instead of the latest one.
    pub file: Option<String>,
    /// Message for the error banner.
    pub error: Option<String>,
}

/// One entry of the file picker.
struct FileOption {
    filename: String,
    display_name: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    jobs: Vec<JobRecord>,
    job_count: usize,
    files: Vec<FileOption>,
    current_label: Option<String>,
    error: Option<String>,
}

/// GET /
///
/// Render the jobs of the latest file, or of `?file=` when it names a
/// listed file. A file that cannot be read is reported in the error banner
/// rather than failing the page.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let files = state.store.list_result_files().await?;

    let current = query
        .file
        .as_ref()
        .filter(|wanted| files.contains(wanted))
        .or_else(|| files.first())
        .cloned();

    let mut error = query.error.filter(|e| !e.trim().is_empty());
    let jobs = match &current {
        Some(file) => match state.store.read_result_file(file).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(%file, error = %e, "Could not load result file for page");
                error.get_or_insert_with(|| format!("Could not load {}", naming::display_name(file)));
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let template = IndexTemplate {
        job_count: jobs.len(),
        jobs,
        current_label: current.as_deref().map(naming::display_name),
        files: files
            .into_iter()
            .map(|filename| FileOption {
                display_name: naming::display_name(&filename),
                selected: current.as_ref() == Some(&filename),
                filename,
            })
            .collect(),
        error,
    };

    Ok(Html(template.render()?))
}

/// GET /static/app.js
pub async fn app_js() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        APP_JS,
    )
}
