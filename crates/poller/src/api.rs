//! HTTP access to the scraper API.

use std::future::Future;
use std::time::Duration;

use jobscrape_core::request::ScrapeRequest;
use jobscrape_core::scrape_state::ScrapeState;
use jobscrape_core::wire::{
    ErrorResponse, FileListResponse, JobFileResponse, StatusResponse, TriggerResponse,
};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::error::PollError;

/// Per-request timeout of the HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The endpoints a poll session needs.
pub trait ScraperApi {
    /// `GET /api/files`
    fn list_files(&self) -> impl Future<Output = Result<FileListResponse, PollError>> + Send;

    /// `POST /run-scraper`
    fn trigger(
        &self,
        request: &ScrapeRequest,
    ) -> impl Future<Output = Result<TriggerResponse, PollError>> + Send;

    /// `GET /api/scraper/status`
    fn status(&self) -> impl Future<Output = Result<ScrapeState, PollError>> + Send;

    /// `GET /jobs/{filename}`
    fn load_file(
        &self,
        filename: &str,
    ) -> impl Future<Output = Result<JobFileResponse, PollError>> + Send;
}

/// [`ScraperApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpScraperApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpScraperApi {
    pub fn new(base_url: &str) -> Result<Self, PollError> {
        let base_url =
            Url::parse(base_url).map_err(|_| PollError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(PollError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Base URL joined with `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, PollError> {
        let response = self.client.get(self.endpoint(segments)).send().await?;
        decode(response).await
    }
}

/// Parse a success body as `T`, or turn an error status into
/// [`PollError::Api`] using the server's `{ error }` message when present.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PollError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(PollError::Api {
        status: status.as_u16(),
        message,
    })
}

impl ScraperApi for HttpScraperApi {
    async fn list_files(&self) -> Result<FileListResponse, PollError> {
        self.get_json(&["api", "files"]).await
    }

    async fn trigger(&self, request: &ScrapeRequest) -> Result<TriggerResponse, PollError> {
        let response = self
            .client
            .post(self.endpoint(&["run-scraper"]))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn status(&self) -> Result<ScrapeState, PollError> {
        let body: StatusResponse = self.get_json(&["api", "scraper", "status"]).await?;
        Ok(body.status)
    }

    async fn load_file(&self, filename: &str) -> Result<JobFileResponse, PollError> {
        self.get_json(&["jobs", filename]).await
    }
}
