//! Interpretation of the scraper's console output.

use std::sync::LazyLock;

use regex::Regex;

use crate::naming;

/// Matches both `Results will be saved to: output/x.json` (printed before
/// scraping) and `Results saved to output/x.json (12 jobs total)` (printed
/// after the file is written).
static SAVED_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)results\s+(?:will\s+be\s+)?saved\s+to:?\s+(?P<path>\S*?\.json)")
        .expect("valid regex")
});

/// Bytes of stderr kept when reporting a failed run.
pub const STDERR_TAIL_BYTES: usize = 2048;

/// Name of the result file announced on `stdout`, if any.
///
/// The last announcement wins. Only the final path component is returned,
/// and only when it is a safe result filename.
pub fn extract_output_file(stdout: &str) -> Option<String> {
    SAVED_TO_RE
        .captures_iter(stdout)
        .filter_map(|caps| {
            let path = caps.name("path")?.as_str();
            let name = path.rsplit(['/', '\\']).next()?;
            naming::is_safe_file_name(name).then(|| name.to_string())
        })
        .last()
}

/// Last [`STDERR_TAIL_BYTES`] of `stderr`, cut on a character boundary.
pub fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}
