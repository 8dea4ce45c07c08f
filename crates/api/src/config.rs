use std::path::PathBuf;
use std::time::Duration;

use jobscrape_core::scraper::command::{ScraperCommand, DEFAULT_SCRAPER_TIMEOUT};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to `job_scraper.py`
/// in a checkout. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for a cancelled scrape to be reaped.
    pub shutdown_timeout_secs: u64,
    /// Directory the scraper writes result files into.
    pub output_dir: PathBuf,
    /// How to launch the external scraper.
    pub scraper: ScraperCommand,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("SCRAPER_PROGRAM must not be empty")]
    EmptyProgram,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                     |
    /// | `OUTPUT_DIR`            | `output`                 |
    /// | `SCRAPER_PROGRAM`       | `python3`                |
    /// | `SCRAPER_ARGS`          | `job_scraper.py`         |
    /// | `SCRAPER_WORKDIR`       | `.`                      |
    /// | `SCRAPER_TIMEOUT_SECS`  | `900`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port: u16 = parse_var("PORT", "port number", var("PORT", "3000"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var(
            "REQUEST_TIMEOUT_SECS",
            "number of seconds",
            var("REQUEST_TIMEOUT_SECS", "30"),
        )?;
        let shutdown_timeout_secs: u64 = parse_var(
            "SHUTDOWN_TIMEOUT_SECS",
            "number of seconds",
            var("SHUTDOWN_TIMEOUT_SECS", "10"),
        )?;

        let default_timeout = DEFAULT_SCRAPER_TIMEOUT.as_secs().to_string();
        let scraper_timeout_secs: u64 = parse_var(
            "SCRAPER_TIMEOUT_SECS",
            "number of seconds",
            var("SCRAPER_TIMEOUT_SECS", &default_timeout),
        )?;

        let program = var("SCRAPER_PROGRAM", "python3").trim().to_string();
        if program.is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        let base_args = var("SCRAPER_ARGS", "job_scraper.py")
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            output_dir: PathBuf::from(var("OUTPUT_DIR", "output")),
            scraper: ScraperCommand {
                program,
                base_args,
                working_directory: Some(PathBuf::from(var("SCRAPER_WORKDIR", "."))),
                timeout: Duration::from_secs(scraper_timeout_secs),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}
