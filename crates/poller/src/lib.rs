//! Client side of the scrape workflow.
//!
//! [`PollSession`](session::PollSession) triggers a scrape through a
//! [`ScraperApi`](api::ScraperApi), then watches the server until a new
//! result file is available, the run fails, or the poll budget runs out.

pub mod api;
pub mod error;
pub mod session;
