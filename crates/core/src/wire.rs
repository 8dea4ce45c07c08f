//! JSON payloads exchanged between the HTTP API and its clients.
//!
//! Every response carries a `success` flag. Field names are camelCase on
//! the wire.

use serde::{Deserialize, Serialize};

use crate::job::JobRecord;
use crate::naming;
use crate::scrape_state::ScrapeState;
use crate::types::RunId;

/// `GET /jobs/{filename}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFileResponse {
    pub success: bool,
    pub jobs: Vec<JobRecord>,
    pub job_count: usize,
    pub filename: String,
    pub display_name: String,
}

impl JobFileResponse {
    pub fn new(filename: String, jobs: Vec<JobRecord>) -> Self {
        Self {
            success: true,
            job_count: jobs.len(),
            display_name: naming::display_name(&filename),
            filename,
            jobs,
        }
    }
}

/// One entry of the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub filename: String,
    pub display_name: String,
}

impl FileEntry {
    pub fn new(filename: String) -> Self {
        Self {
            display_name: naming::display_name(&filename),
            filename,
        }
    }
}

/// `GET /api/files`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub success: bool,
    pub latest: Option<String>,
    pub files: Vec<FileEntry>,
}

impl FileListResponse {
    /// Build from filenames already ordered most recent first.
    pub fn new(files: Vec<String>) -> Self {
        Self {
            success: true,
            latest: files.first().cloned(),
            files: files.into_iter().map(FileEntry::new).collect(),
        }
    }
}

/// `POST /run-scraper` acknowledgement (202).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    pub estimated_time: String,
    pub run_id: RunId,
}

/// `GET /api/scraper/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: ScrapeState,
}

/// Body of every JSON error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default)]
    pub code: String,
}
