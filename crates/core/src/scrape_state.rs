//! Server-side lifecycle of a scrape run.
//!
//! ```text
//! Idle -> Running -> { Completed | Failed | TimedOut }
//! ```
//!
//! Any terminal state may move back to `Running` when a new trigger is
//! admitted. Only one run is tracked at a time.

use serde::{Deserialize, Serialize};

use crate::request::ScrapeRequest;
use crate::types::{RunId, Timestamp};

/// Snapshot of the scrape lifecycle, as served by the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScrapeState {
    /// No scrape has been triggered since the server started.
    #[default]
    Idle,
    Running {
        run_id: RunId,
        request: ScrapeRequest,
        started_at: Timestamp,
    },
    /// The scraper exited zero. `file` is `None` when neither its output
    /// nor a re-listing of the store identified a new result file.
    Completed {
        run_id: RunId,
        file: Option<String>,
        finished_at: Timestamp,
        duration_ms: u64,
    },
    Failed {
        run_id: RunId,
        reason: String,
        exit_code: Option<i32>,
        stderr_tail: Option<String>,
        finished_at: Timestamp,
    },
    TimedOut {
        run_id: RunId,
        elapsed_ms: u64,
        finished_at: Timestamp,
    },
}

impl ScrapeState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::TimedOut { .. }
        )
    }

    /// Run this state belongs to; `None` while idle.
    pub fn run_id(&self) -> Option<RunId> {
        match self {
            Self::Idle => None,
            Self::Running { run_id, .. }
            | Self::Completed { run_id, .. }
            | Self::Failed { run_id, .. }
            | Self::TimedOut { run_id, .. } => Some(*run_id),
        }
    }

    /// Short lowercase name of the state (`idle`, `running`, ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}
