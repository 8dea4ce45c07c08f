use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobscrape_core::error::CoreError;
use jobscrape_core::wire::ErrorResponse;
use jobscrape_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoreError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ success: false, error, code }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jobscrape_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A result store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Page rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            AppError::Store(err) => classify_store_error(err),

            AppError::Template(err) => {
                tracing::error!(error = %err, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - missing files map to 404;
/// - names that are not a plain `.json` file map to 400;
/// - corrupt files map to 500 with a fixed message (details are logged
///   by the store);
/// - everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        StoreError::InvalidName(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
        StoreError::Parse { file, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "PARSE_ERROR",
            format!("Failed to read job file '{file}'"),
        ),
        StoreError::Io(io) => {
            tracing::error!(error = %io, "Result store I/O error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}
