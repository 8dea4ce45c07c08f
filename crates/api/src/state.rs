use std::sync::Arc;

use jobscrape_store::ResultStore;

use crate::config::ServerConfig;
use crate::scraping::ScrapeSupervisor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read-only view over the scraper's output directory.
    pub store: Arc<ResultStore>,
    /// Owner of the scrape lifecycle; admits at most one run at a time.
    pub supervisor: Arc<ScrapeSupervisor>,
}

impl AppState {
    /// Build the state for `config`: a store over its output directory and
    /// a supervisor launching its scraper command.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(ResultStore::new(config.output_dir.clone()));
        let supervisor = Arc::new(ScrapeSupervisor::new(
            config.scraper.clone(),
            Arc::clone(&store),
        ));
        Self {
            config: Arc::new(config),
            store,
            supervisor,
        }
    }
}
