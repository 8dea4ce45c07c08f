//! Background scrape execution.
//!
//! The HTTP layer never waits on the scraper: [`ScrapeSupervisor`] admits a
//! request, runs it on a spawned task and publishes the lifecycle through
//! [`ScrapeState`](jobscrape_core::scrape_state::ScrapeState) snapshots.

pub mod supervisor;

pub use supervisor::ScrapeSupervisor;
