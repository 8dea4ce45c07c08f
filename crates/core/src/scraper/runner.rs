//! One complete scraper run: validate, launch, wait, interpret.

use tokio_util::sync::CancellationToken;

use super::command::ScraperCommand;
use super::output::{extract_output_file, stderr_tail};
use super::subprocess::{self, ProcessError};
use crate::request::ScrapeRequest;

/// How a launched scraper run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Exit code zero and the output named the result file.
    Completed { file: String, duration_ms: u64 },
    /// Exit code zero but no result file was announced. The caller should
    /// re-list the store and diff against the latest file known before
    /// the run.
    SucceededNoFile { duration_ms: u64 },
    /// Non-zero exit.
    Failed {
        exit_code: i32,
        stderr_tail: String,
        duration_ms: u64,
    },
    /// The run exceeded its budget and its process group was killed.
    TimedOut { elapsed_ms: u64 },
    /// The run was cancelled (server shutdown) and its process group killed.
    Cancelled { elapsed_ms: u64 },
}

/// Errors that prevent a run from producing an outcome.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The request failed validation; nothing was launched.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("failed to launch scraper '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost track of scraper process: {0}")]
    Wait(#[source] std::io::Error),
}

/// Launches the external scraper for validated requests.
#[derive(Debug, Clone)]
pub struct ScrapeRunner {
    command: ScraperCommand,
}

impl ScrapeRunner {
    pub fn new(command: ScraperCommand) -> Self {
        Self { command }
    }

    /// Run the scraper for `request` and wait for it to finish.
    ///
    /// Invalid requests return [`ScrapeError::InvalidRequest`] before any
    /// process is spawned.
    pub async fn run(
        &self,
        request: ScrapeRequest,
        cancel: &CancellationToken,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let request = request
            .normalize()
            .map_err(|e| ScrapeError::InvalidRequest(e.to_string()))?;

        tracing::info!(
            program = %self.command.program,
            title = %request.title,
            location = %request.location,
            experience = %request.experience,
            "Launching scraper",
        );

        let mut cmd = self.command.build(&request);
        let output = match subprocess::run_command(&mut cmd, self.command.timeout, cancel).await {
            Ok(output) => output,
            Err(ProcessError::Spawn(source)) => {
                return Err(ScrapeError::Launch {
                    program: self.command.program.clone(),
                    source,
                })
            }
            Err(ProcessError::Wait(e)) => return Err(ScrapeError::Wait(e)),
            Err(ProcessError::TimedOut { elapsed_ms }) => {
                tracing::warn!(elapsed_ms, "Scraper timed out, process group killed");
                return Ok(ScrapeOutcome::TimedOut { elapsed_ms });
            }
            Err(ProcessError::Cancelled { elapsed_ms }) => {
                tracing::info!(elapsed_ms, "Scraper cancelled, process group killed");
                return Ok(ScrapeOutcome::Cancelled { elapsed_ms });
            }
        };

        if !output.stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr_tail(&output.stderr), "Scraper stderr");
        }

        if output.exit_code != 0 {
            tracing::warn!(
                exit_code = output.exit_code,
                duration_ms = output.duration_ms,
                "Scraper exited with failure",
            );
            return Ok(ScrapeOutcome::Failed {
                exit_code: output.exit_code,
                stderr_tail: stderr_tail(&output.stderr),
                duration_ms: output.duration_ms,
            });
        }

        Ok(match extract_output_file(&output.stdout) {
            Some(file) => ScrapeOutcome::Completed {
                file,
                duration_ms: output.duration_ms,
            },
            None => ScrapeOutcome::SucceededNoFile {
                duration_ms: output.duration_ms,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::scraper::test_helpers::bash_scraper;

    fn request() -> ScrapeRequest {
        ScrapeRequest::new("Engineer", "NY", "3")
    }

    #[tokio::test]
    async fn invalid_request_never_launches() {
        let dir = tempfile::tempdir().expect("temp dir");
        let marker = dir.path().join("launched");
        let cmd = bash_scraper(
            dir.path(),
            &format!("touch '{}'\n", marker.display()),
            Duration::from_secs(5),
        );

        let result = ScrapeRunner::new(cmd)
            .run(ScrapeRequest::new("", "NY", ""), &CancellationToken::new())
            .await;

        assert_matches!(result, Err(ScrapeError::InvalidRequest(_)));
        assert!(!marker.exists(), "scraper must not be launched");
    }

    #[tokio::test]
    async fn arguments_arrive_unsplit() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args_file = dir.path().join("args.txt");
        let cmd = bash_scraper(
            dir.path(),
            &format!("printf '%s\\n' \"$@\" > '{}'\n", args_file.display()),
            Duration::from_secs(5),
        );

        let outcome = ScrapeRunner::new(cmd)
            .run(
                ScrapeRequest::new("Engineer; touch pwned", "New York", ""),
                &CancellationToken::new(),
            )
            .await
            .expect("run");

        assert_matches!(outcome, ScrapeOutcome::SucceededNoFile { .. });
        let args = std::fs::read_to_string(&args_file).expect("args written");
        let lines: Vec<&str> = args.lines().collect();
        assert_eq!(
            lines,
            vec!["--title=Engineer; touch pwned", "--location=New York"]
        );
        assert!(!dir.path().join("pwned").exists());
    }

    #[tokio::test]
    async fn announced_file_completes_the_run() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cmd = bash_scraper(
            dir.path(),
            "mkdir -p output\n\
             echo '[]' > output/engineer_ny_Jan01_2025_1200.json\n\
             echo 'Results saved to output/engineer_ny_Jan01_2025_1200.json (0 jobs total)'\n",
            Duration::from_secs(5),
        );

        let outcome = ScrapeRunner::new(cmd)
            .run(request(), &CancellationToken::new())
            .await
            .expect("run");

        assert_matches!(
            outcome,
            ScrapeOutcome::Completed { file, .. } if file == "engineer_ny_Jan01_2025_1200.json"
        );
    }

    #[tokio::test]
    async fn silent_success_reports_no_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cmd = bash_scraper(dir.path(), "echo 'done'\n", Duration::from_secs(5));

        let outcome = ScrapeRunner::new(cmd)
            .run(request(), &CancellationToken::new())
            .await
            .expect("run");

        assert_matches!(outcome, ScrapeOutcome::SucceededNoFile { .. });
    }

    #[tokio::test]
    async fn nonzero_exit_reports_stderr_tail() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cmd = bash_scraper(
            dir.path(),
            "echo 'chromedriver crashed' >&2\nexit 3\n",
            Duration::from_secs(5),
        );

        let outcome = ScrapeRunner::new(cmd)
            .run(request(), &CancellationToken::new())
            .await
            .expect("run");

        assert_matches!(
            outcome,
            ScrapeOutcome::Failed { exit_code: 3, stderr_tail, .. }
                if stderr_tail.contains("chromedriver crashed")
        );
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let cmd = ScraperCommand {
            program: "/nonexistent/jobscrape-scraper".into(),
            base_args: vec![],
            working_directory: None,
            timeout: Duration::from_secs(5),
        };

        let result = ScrapeRunner::new(cmd)
            .run(request(), &CancellationToken::new())
            .await;

        assert_matches!(result, Err(ScrapeError::Launch { .. }));
    }

    #[tokio::test]
    async fn cancellation_stops_the_run() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cmd = bash_scraper(dir.path(), "exec sleep 60\n", Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });

        let outcome = ScrapeRunner::new(cmd)
            .run(request(), &cancel)
            .await
            .expect("run");

        assert_matches!(outcome, ScrapeOutcome::Cancelled { .. });
    }

    /// Whether `pid` names a live (non-zombie) process.
    #[cfg(target_os = "linux")]
    fn process_alive(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .map(|(_, rest)| !rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_the_whole_process_group() {
        let dir = tempfile::tempdir().expect("temp dir");
        let pid_file = dir.path().join("grandchild.pid");
        let cmd = bash_scraper(
            dir.path(),
            &format!("sleep 60 &\necho $! > '{}'\nwait\n", pid_file.display()),
            Duration::from_millis(500),
        );

        let outcome = ScrapeRunner::new(cmd)
            .run(request(), &CancellationToken::new())
            .await
            .expect("run");
        assert_matches!(outcome, ScrapeOutcome::TimedOut { elapsed_ms } if elapsed_ms >= 500);

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .expect("pid written")
            .trim()
            .parse()
            .expect("numeric pid");

        let mut alive = process_alive(pid);
        for _ in 0..20 {
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            alive = process_alive(pid);
        }
        assert!(!alive, "grandchild {pid} survived the timeout");
    }
}
