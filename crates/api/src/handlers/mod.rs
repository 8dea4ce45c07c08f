//! Request handlers.
//!
//! Each submodule provides async handler functions for one area of the
//! API. Handlers delegate to the result store or the scrape supervisor and
//! map errors via [`AppError`](crate::error::AppError).

pub mod jobs;
pub mod scraper;
pub mod ui;
