//! External scraper invocation.
//!
//! The scraper is an opaque program (by default `python3 job_scraper.py`)
//! that writes one result file into the output directory and prints its
//! path. This module builds its argument list, supervises the child
//! process and interprets what it printed. No HTTP and no shared state
//! live here; the API crate owns admission control.

pub mod command;
pub mod output;
pub mod runner;
pub mod subprocess;
