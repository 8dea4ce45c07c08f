//! Domain logic shared by the jobscrape server and its clients.
//!
//! Holds the job record model, result-file naming conventions, scrape
//! request validation, the scraper subprocess runner and the scrape
//! lifecycle state. Nothing in here touches HTTP.

pub mod error;
pub mod job;
pub mod naming;
pub mod request;
pub mod scrape_state;
pub mod scraper;
pub mod types;
pub mod wire;
