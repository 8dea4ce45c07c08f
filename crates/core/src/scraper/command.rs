//! Scraper command line construction.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;

use crate::request::ScrapeRequest;

/// Default wall-clock budget for one scraper run (15 minutes).
pub const DEFAULT_SCRAPER_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// How to launch the external scraper.
#[derive(Debug, Clone)]
pub struct ScraperCommand {
    /// Executable to run, e.g. `python3`.
    pub program: String,
    /// Arguments placed before the search parameters, e.g. the script path.
    pub base_args: Vec<String>,
    /// Working directory of the child (current directory if `None`).
    pub working_directory: Option<PathBuf>,
    /// Maximum wall-clock time before the process group is killed.
    pub timeout: Duration,
}

impl ScraperCommand {
    /// Full argument list for `request`, after `base_args`.
    ///
    /// Each parameter is a single `--flag=value` argument, so a value can
    /// neither be split by a shell nor be mistaken for another flag.
    pub fn args_for(&self, request: &ScrapeRequest) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push(format!("--title={}", request.title));
        args.push(format!("--location={}", request.location));
        if !request.experience.is_empty() {
            args.push(format!("--experience={}", request.experience));
        }
        args
    }

    /// Build the child process command for `request`.
    pub fn build(&self, request: &ScrapeRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(request));
        // Python buffers stdout when it is a pipe; the output path is only
        // printed near the end, but partial output matters on timeout.
        cmd.env("PYTHONUNBUFFERED", "1");
        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }
        cmd
    }
}
