//! Handlers for triggering the scraper and observing its lifecycle.

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use jobscrape_core::request::ScrapeRequest;
use jobscrape_core::wire::{StatusResponse, TriggerResponse};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Shown to clients until the status endpoint reports an outcome.
const ESTIMATED_TIME: &str = "Several minutes";

/// A [`ScrapeRequest`] read from either a JSON or a form-urlencoded body.
///
/// The body format is chosen by `Content-Type`; anything that is not JSON
/// is parsed as a form. Malformed bodies are rejected with `BAD_REQUEST`.
#[derive(Debug)]
pub struct ScrapeForm(pub ScrapeRequest);

impl FromRequest<AppState> for ScrapeForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let request = if is_json {
            Json::<ScrapeRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .0
        } else {
            Form::<ScrapeRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .0
        };

        Ok(Self(request))
    }
}

/// POST /run-scraper
///
/// Admit a scrape and return 202 immediately. Returns 400 for a missing
/// title or location and 409 while another scrape is running. The outcome
/// is reported by `GET /api/scraper/status`.
pub async fn run_scraper(
    State(state): State<AppState>,
    ScrapeForm(request): ScrapeForm,
) -> AppResult<impl IntoResponse> {
    let run_id = state.supervisor.start(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            success: true,
            message: "Scraper started successfully".to_string(),
            estimated_time: ESTIMATED_TIME.to_string(),
            run_id,
        }),
    ))
}

/// GET /api/scraper/status
pub async fn scraper_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        status: state.supervisor.status().await,
    })
}
