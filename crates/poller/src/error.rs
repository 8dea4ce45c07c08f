/// Errors raised while talking to the scraper API.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The request was rejected locally; nothing was sent.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}
