//! Job scraper web front-end.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! scrape supervision) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod scraping;
pub mod state;
