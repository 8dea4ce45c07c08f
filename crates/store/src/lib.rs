//! File-backed store of scraper result files.
//!
//! The output directory is the only persistence layer: each scrape adds
//! one JSON array file, and the most recent file is the current result.
//! The store never writes; the external scraper does.

pub mod error;
pub mod result_store;

pub use error::StoreError;
pub use result_store::ResultStore;
