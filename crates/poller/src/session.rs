//! Trigger-then-poll session.
//!
//! One session covers one scrape: it records the latest result file,
//! triggers the run, then checks the server on a fixed schedule while a
//! progress estimate ticks upward. Both timers live inside [`PollSession::run`]
//! and are dropped together on every exit path, including cancellation.

use std::time::Duration;

use jobscrape_core::request::ScrapeRequest;
use jobscrape_core::scrape_state::ScrapeState;
use jobscrape_core::types::RunId;
use jobscrape_core::wire::JobFileResponse;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::ScraperApi;
use crate::error::PollError;

/// Timing and progress parameters of a poll session.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Progress shown once the trigger is accepted (percent).
    pub progress_start: u8,
    /// Progress added per tick.
    pub progress_step: u8,
    /// Progress never exceeds this until the run really finished.
    pub progress_cap: u8,
    pub progress_tick: Duration,
    /// Delay before the first status check.
    pub first_poll: Duration,
    pub poll_interval: Duration,
    /// Status checks before the session gives up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            progress_start: 10,
            progress_step: 5,
            progress_cap: 95,
            progress_tick: Duration::from_secs(10),
            first_poll: Duration::from_secs(5),
            poll_interval: Duration::from_secs(10),
            max_attempts: 90,
        }
    }
}

/// How a poll session ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// A new result file is available; its records were loaded.
    Completed { file: String, jobs: JobFileResponse },
    /// The scraper reported failure.
    Failed {
        reason: String,
        exit_code: Option<i32>,
        stderr_tail: Option<String>,
    },
    /// The server killed the scraper after its time budget.
    ScraperTimedOut { elapsed_ms: u64 },
    /// The scraper succeeded but no new result file appeared.
    FinishedWithoutFile,
    /// The poll budget ran out; the scrape may still be running.
    TimedOut { attempts: u32 },
    Cancelled,
}

/// What a status check found once the run has ended.
#[derive(Debug)]
enum Finished {
    NewFile(String),
    Failed {
        reason: String,
        exit_code: Option<i32>,
        stderr_tail: Option<String>,
    },
    ScraperTimedOut {
        elapsed_ms: u64,
    },
    NoFile,
}

/// Drives one scrape from trigger to outcome.
pub struct PollSession<A> {
    api: A,
    config: PollConfig,
    progress: watch::Sender<u8>,
}

impl<A: ScraperApi> PollSession<A> {
    pub fn new(api: A, config: PollConfig) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            api,
            config,
            progress,
        }
    }

    /// Progress estimate in percent, updated while [`run`](Self::run) is active.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Trigger a scrape for `request` and wait for its outcome.
    ///
    /// Transport and API errors during polling are logged and retried;
    /// errors before the trigger is accepted, or while loading the new
    /// file, are returned.
    pub async fn run(
        &self,
        request: ScrapeRequest,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, PollError> {
        let request = request
            .normalize()
            .map_err(|e| PollError::InvalidRequest(e.to_string()))?;

        let baseline = self.api.list_files().await?.latest;
        let trigger = self.api.trigger(&request).await?;
        let run_id = trigger.run_id;
        tracing::info!(
            %run_id,
            baseline = baseline.as_deref().unwrap_or("-"),
            estimated_time = %trigger.estimated_time,
            "Scrape triggered",
        );

        let mut progress = self.config.progress_start;
        self.progress.send_replace(progress);

        let tick = self.config.progress_tick;
        let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
        let poll = tokio::time::sleep(self.config.first_poll);
        tokio::pin!(poll);
        let mut attempt: u32 = 0;

        let finished = loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::info!(%run_id, attempt, "Poll session cancelled");
                    return Ok(PollOutcome::Cancelled);
                }
                () = &mut poll => {
                    attempt += 1;
                    match self.check(run_id, baseline.as_deref()).await {
                        Ok(Some(finished)) => break finished,
                        Ok(None) => {
                            tracing::debug!(%run_id, attempt, "Scrape still running");
                        }
                        Err(e) => {
                            tracing::warn!(%run_id, attempt, error = %e, "Status check failed");
                        }
                    }
                    if attempt >= self.config.max_attempts {
                        tracing::warn!(%run_id, attempt, "Poll budget exhausted");
                        return Ok(PollOutcome::TimedOut { attempts: attempt });
                    }
                    poll.as_mut().reset(Instant::now() + self.config.poll_interval);
                }
                _ = ticker.tick() => {
                    progress = progress
                        .saturating_add(self.config.progress_step)
                        .min(self.config.progress_cap);
                    self.progress.send_replace(progress);
                }
            }
        };

        let outcome = match finished {
            Finished::NewFile(file) => {
                let jobs = self.api.load_file(&file).await?;
                self.progress.send_replace(100);
                tracing::info!(%run_id, %file, job_count = jobs.job_count, "Scrape results loaded");
                PollOutcome::Completed { file, jobs }
            }
            Finished::NoFile => {
                self.progress.send_replace(100);
                tracing::info!(%run_id, "Scrape finished without a new result file");
                PollOutcome::FinishedWithoutFile
            }
            Finished::Failed {
                reason,
                exit_code,
                stderr_tail,
            } => {
                tracing::warn!(%run_id, %reason, ?exit_code, "Scrape failed");
                PollOutcome::Failed {
                    reason,
                    exit_code,
                    stderr_tail,
                }
            }
            Finished::ScraperTimedOut { elapsed_ms } => {
                tracing::warn!(%run_id, elapsed_ms, "Scraper timed out on the server");
                PollOutcome::ScraperTimedOut { elapsed_ms }
            }
        };
        Ok(outcome)
    }

    /// One status check; `None` while the run is still going.
    ///
    /// Falls back to the listing when the status does not name this run's
    /// file.
    async fn check(
        &self,
        run_id: RunId,
        baseline: Option<&str>,
    ) -> Result<Option<Finished>, PollError> {
        let status = self.api.status().await?;

        if status.run_id() == Some(run_id) {
            match status {
                ScrapeState::Running { .. } => return Ok(None),
                ScrapeState::Completed {
                    file: Some(file), ..
                } => return Ok(Some(Finished::NewFile(file))),
                ScrapeState::Failed {
                    reason,
                    exit_code,
                    stderr_tail,
                    ..
                } => {
                    return Ok(Some(Finished::Failed {
                        reason,
                        exit_code,
                        stderr_tail,
                    }))
                }
                ScrapeState::TimedOut { elapsed_ms, .. } => {
                    return Ok(Some(Finished::ScraperTimedOut { elapsed_ms }))
                }
                ScrapeState::Completed { file: None, .. } => {
                    let found = self.new_file_since(baseline).await?;
                    return Ok(Some(found.map_or(Finished::NoFile, Finished::NewFile)));
                }
                ScrapeState::Idle => {}
            }
        }

        // Idle after a restart, or another run: only the listing can tell.
        Ok(self.new_file_since(baseline).await?.map(Finished::NewFile))
    }

    /// Latest listed file, if it differs from `baseline`.
    async fn new_file_since(&self, baseline: Option<&str>) -> Result<Option<String>, PollError> {
        let latest = self.api.list_files().await?.latest;
        Ok(latest.filter(|latest| Some(latest.as_str()) != baseline))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
