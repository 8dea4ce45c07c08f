//! Result file naming conventions.
//!
//! The scraper names its output after the search that produced it:
//!
//! - search form: `{job}_{location}_{datecode}_{time}.json`, e.g.
//!   `senior_engineer_seattle_wa_Feb27_2025_1435.json`. The datecode is
//!   `%b%d_%Y`; older runs wrote a yearless `%b%d`.
//! - legacy form: `all_jobs_{datecode}.json`.
//!
//! Splitting the job slug from the location slug is ambiguous because both
//! may contain underscores. The job is taken to be the first segment; the
//! result is only used for display.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

static SEARCH_FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<job>.+?)_(?P<location>.+?)_(?P<date>[A-Za-z]{3}\d{1,2}(?:_\d{4})?)_(?P<time>\d{4})\.json$",
    )
    .expect("valid regex")
});

static LEGACY_FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^all_jobs_(?P<rest>.+)\.json$").expect("valid regex"));

/// Longest filename accepted from a request path.
const MAX_FILE_NAME_LEN: usize = 255;

/// Structure recovered from a result filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultFileName {
    Search {
        job: String,
        location: String,
        datecode: String,
        time: String,
    },
    Legacy {
        rest: String,
    },
}

impl ResultFileName {
    /// Parse a filename against the known conventions.
    pub fn parse(file_name: &str) -> Option<Self> {
        // Legacy names also satisfy the search pattern, so test them first.
        if let Some(caps) = LEGACY_FORM_RE.captures(file_name) {
            return Some(Self::Legacy {
                rest: caps["rest"].to_string(),
            });
        }

        SEARCH_FORM_RE.captures(file_name).map(|caps| Self::Search {
            job: caps["job"].to_string(),
            location: caps["location"].to_string(),
            datecode: caps["date"].to_string(),
            time: caps["time"].to_string(),
        })
    }

    /// Timestamp encoded in the name, when it carries a full date.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Search { datecode, time, .. } => {
                NaiveDateTime::parse_from_str(&format!("{datecode}_{time}"), "%b%d_%Y_%H%M").ok()
            }
            Self::Legacy { rest } => NaiveDate::parse_from_str(rest, "%b%d_%Y")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }

    /// Human-readable label.
    pub fn display(&self) -> String {
        match self {
            Self::Search {
                job,
                location,
                datecode,
                time,
            } => {
                let (hours, minutes) = time.split_at(2);
                format!(
                    "{} in {} ({datecode} {hours}:{minutes})",
                    job.replace('_', " "),
                    location.replace('_', " "),
                )
            }
            Self::Legacy { rest } => format!("search from {rest}"),
        }
    }
}

/// Whether `file_name` follows one of the result file conventions.
pub fn is_result_file(file_name: &str) -> bool {
    is_safe_file_name(file_name) && ResultFileName::parse(file_name).is_some()
}

/// Label shown for a result file; falls back to the raw name.
pub fn display_name(file_name: &str) -> String {
    ResultFileName::parse(file_name)
        .map(|parsed| parsed.display())
        .unwrap_or_else(|| file_name.to_string())
}

/// Whether `file_name` is a single plain `.json` path component.
///
/// Rejects separators, parent references, hidden files and NUL bytes so a
/// name taken from a URL cannot leave the output directory.
pub fn is_safe_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name.len() <= MAX_FILE_NAME_LEN
        && file_name.ends_with(".json")
        && !file_name.starts_with('.')
        && !file_name.contains(['/', '\\', '\0'])
        && !file_name.contains("..")
}
