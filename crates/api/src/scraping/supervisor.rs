//! Admission control and background execution of scraper runs.
//!
//! Held in [`AppState`](crate::state::AppState) as an
//! `Arc<ScrapeSupervisor>`. The trigger handler calls [`ScrapeSupervisor::start`],
//! which returns as soon as the run is admitted; the status endpoint reads
//! [`ScrapeSupervisor::status`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobscrape_core::error::CoreError;
use jobscrape_core::request::ScrapeRequest;
use jobscrape_core::scrape_state::ScrapeState;
use jobscrape_core::scraper::command::ScraperCommand;
use jobscrape_core::scraper::runner::{ScrapeOutcome, ScrapeRunner};
use jobscrape_core::types::RunId;
use jobscrape_store::ResultStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs at most one scrape at a time and tracks its lifecycle.
///
/// Lifecycle:
/// 1. Validate the request (nothing is recorded on failure).
/// 2. Reject with a conflict while another run is `Running`.
/// 3. Record the latest result file as the baseline.
/// 4. Publish `Running` and spawn the run.
/// 5. Publish the terminal state when the runner returns.
pub struct ScrapeSupervisor {
    runner: ScrapeRunner,
    store: Arc<ResultStore>,
    state: Arc<Mutex<ScrapeState>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScrapeSupervisor {
    pub fn new(command: ScraperCommand, store: Arc<ResultStore>) -> Self {
        Self {
            runner: ScrapeRunner::new(command),
            store,
            state: Arc::new(Mutex::new(ScrapeState::Idle)),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Admit `request` and start it in the background.
    ///
    /// Returns the new run's id. Fails with `Validation` for an invalid
    /// request and with `Conflict` while a run is in progress or after
    /// shutdown has begun.
    pub async fn start(&self, request: ScrapeRequest) -> Result<RunId, CoreError> {
        let request = request.normalize()?;

        if self.cancel.is_cancelled() {
            return Err(CoreError::Conflict(
                "Server is shutting down; scrape not started".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if let ScrapeState::Running { run_id, .. } = &*state {
            return Err(CoreError::Conflict(format!(
                "A scrape is already running (run {run_id})"
            )));
        }

        let baseline = match self.store.latest().await {
            Ok(latest) => latest,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list result files before scrape");
                None
            }
        };

        let run_id = uuid::Uuid::now_v7();
        *state = ScrapeState::Running {
            run_id,
            request: request.clone(),
            started_at: Utc::now(),
        };

        tracing::info!(
            %run_id,
            title = %request.title,
            location = %request.location,
            baseline = baseline.as_deref().unwrap_or("-"),
            "Scrape admitted",
        );

        let run = ScrapeRun {
            run_id,
            request,
            baseline,
            runner: self.runner.clone(),
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            cancel: self.cancel.clone(),
        };
        // The handle is stored before the state lock is released; the run
        // publishes its terminal state under that lock, so no later run can
        // be admitted and store its handle first.
        let handle = tokio::spawn(run.execute());
        *self.task.lock().await = Some(handle);
        drop(state);

        Ok(run_id)
    }

    /// Current lifecycle snapshot.
    pub async fn status(&self) -> ScrapeState {
        self.state.lock().await.clone()
    }

    /// Stop admitting runs, cancel the running scrape (killing its process
    /// group) and wait up to `timeout` for its task to finish.
    pub async fn shutdown(&self, timeout: Duration) {
        self.cancel.cancel();

        let Some(handle) = self.task.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => tracing::info!("Scrape task stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Scrape task panicked"),
            Err(_) => tracing::warn!(?timeout, "Scrape task did not stop in time"),
        }
    }
}

/// Everything one spawned run needs, moved into its task.
struct ScrapeRun {
    run_id: RunId,
    request: ScrapeRequest,
    baseline: Option<String>,
    runner: ScrapeRunner,
    store: Arc<ResultStore>,
    state: Arc<Mutex<ScrapeState>>,
    cancel: CancellationToken,
}

impl ScrapeRun {
    async fn execute(self) {
        let run_id = self.run_id;
        let result = self.runner.run(self.request.clone(), &self.cancel).await;

        let next = match result {
            Ok(ScrapeOutcome::Completed { file, duration_ms }) => ScrapeState::Completed {
                run_id,
                file: self.resolve_file(Some(file)).await,
                finished_at: Utc::now(),
                duration_ms,
            },
            Ok(ScrapeOutcome::SucceededNoFile { duration_ms }) => ScrapeState::Completed {
                run_id,
                file: self.resolve_file(None).await,
                finished_at: Utc::now(),
                duration_ms,
            },
            Ok(ScrapeOutcome::Failed {
                exit_code,
                stderr_tail,
                ..
            }) => ScrapeState::Failed {
                run_id,
                reason: format!("Scraper exited with code {exit_code}"),
                exit_code: Some(exit_code),
                stderr_tail: (!stderr_tail.is_empty()).then_some(stderr_tail),
                finished_at: Utc::now(),
            },
            Ok(ScrapeOutcome::TimedOut { elapsed_ms }) => ScrapeState::TimedOut {
                run_id,
                elapsed_ms,
                finished_at: Utc::now(),
            },
            Ok(ScrapeOutcome::Cancelled { .. }) => ScrapeState::Failed {
                run_id,
                reason: "Scrape cancelled by server shutdown".to_string(),
                exit_code: None,
                stderr_tail: None,
                finished_at: Utc::now(),
            },
            Err(e) => {
                tracing::error!(%run_id, error = %e, "Scrape could not run");
                ScrapeState::Failed {
                    run_id,
                    reason: e.to_string(),
                    exit_code: None,
                    stderr_tail: None,
                    finished_at: Utc::now(),
                }
            }
        };

        match &next {
            ScrapeState::Completed {
                file, duration_ms, ..
            } => tracing::info!(
                %run_id,
                file = file.as_deref().unwrap_or("-"),
                duration_ms,
                "Scrape completed",
            ),
            ScrapeState::Failed {
                reason, exit_code, ..
            } => tracing::warn!(%run_id, %reason, ?exit_code, "Scrape failed"),
            ScrapeState::TimedOut { elapsed_ms, .. } => {
                tracing::warn!(%run_id, elapsed_ms, "Scrape timed out")
            }
            ScrapeState::Idle | ScrapeState::Running { .. } => {}
        }

        let mut state = self.state.lock().await;
        if state.run_id() == Some(run_id) {
            *state = next;
        }
    }

    /// The result file this run produced, if it can be identified.
    ///
    /// An announced file counts only if the store lists it. Otherwise a
    /// latest file that differs from the pre-run baseline is taken.
    async fn resolve_file(&self, announced: Option<String>) -> Option<String> {
        if let Some(file) = announced {
            match self.store.contains(&file).await {
                Ok(true) => return Some(file),
                Ok(false) => tracing::warn!(
                    run_id = %self.run_id,
                    %file,
                    "Announced result file is not in the output directory",
                ),
                Err(e) => tracing::warn!(run_id = %self.run_id, error = %e, "Could not list result files"),
            }
        }

        match self.store.latest().await {
            Ok(Some(latest)) if self.baseline.as_deref() != Some(latest.as_str()) => Some(latest),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(run_id = %self.run_id, error = %e, "Could not list result files");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
