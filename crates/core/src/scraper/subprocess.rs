//! Child process supervision for the scraper.
//!
//! [`run_command`] spawns the prepared command in its own process group,
//! captures stdout/stderr concurrently and enforces the wall-clock budget.
//! On timeout or cancellation the whole group is killed, so browser
//! drivers started by the scraper do not outlive it.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Captured result of a process that exited on its own.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by a signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("process timed out after {elapsed_ms}ms")]
    TimedOut { elapsed_ms: u64 },

    #[error("process cancelled after {elapsed_ms}ms")]
    Cancelled { elapsed_ms: u64 },
}

enum Interrupt {
    TimedOut,
    Cancelled,
}

/// Spawn `cmd`, capture its output and wait at most `timeout` for it.
///
/// The caller sets program, arguments, environment and working directory;
/// stdio, process group and kill-on-drop are configured here.
pub async fn run_command(
    cmd: &mut Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ProcessOutput, ProcessError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;
    let pid = child.id();
    tracing::debug!(pid, "Scraper process spawned");

    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let waited = tokio::select! {
        res = tokio::time::timeout(timeout, child.wait()) => res.map_err(|_| Interrupt::TimedOut),
        () = cancel.cancelled() => Err(Interrupt::Cancelled),
    };

    match waited {
        Ok(Ok(status)) => {
            // Reap anything the scraper left behind in its group; it would
            // otherwise keep the pipes open and block the readers.
            kill_process_group(pid);
            let stdout_bytes = stdout_task.await.unwrap_or_default();
            let stderr_bytes = stderr_task.await.unwrap_or_default();

            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
                exit_code: status.code().unwrap_or(-1),
                duration_ms: elapsed_ms(start),
            })
        }
        Ok(Err(e)) => {
            terminate(&mut child, pid).await;
            Err(ProcessError::Wait(e))
        }
        Err(interrupt) => {
            terminate(&mut child, pid).await;
            stdout_task.abort();
            stderr_task.abort();
            let elapsed_ms = elapsed_ms(start);
            Err(match interrupt {
                Interrupt::TimedOut => ProcessError::TimedOut { elapsed_ms },
                Interrupt::Cancelled => ProcessError::Cancelled { elapsed_ms },
            })
        }
    }
}

/// Kill the child's process group, then the child itself, and reap it.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_process_group(pid);
    if let Err(e) = child.kill().await {
        tracing::warn!(pid, error = %e, "Failed to kill scraper process");
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The child was spawned with
    // process_group(0), so its pid is the id of its own group.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // ESRCH: the group is already empty.
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pid, error = %err, "Failed to kill scraper process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Read an entire output stream, keeping the first [`MAX_OUTPUT_BYTES`].
///
/// Bytes past the cap are drained and discarded so the child never blocks
/// on a full pipe.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        if (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await
            .is_ok()
        {
            let _ = tokio::io::copy(&mut h, &mut tokio::io::sink()).await;
        }
    }
    buf
}
