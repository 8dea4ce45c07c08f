//! Scrape request model and validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Maximum length of the title and location fields.
pub const MAX_SEARCH_FIELD_LEN: u64 = 100;

/// Maximum length of the experience field.
pub const MAX_EXPERIENCE_LEN: u64 = 20;

/// Parameters for one scraper run.
///
/// `experience` is free-form (`"3"`, `"0-1"`, `"3-5"`) and may be empty,
/// in which case the scraper falls back to its own configured levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScrapeRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_SEARCH_FIELD_LEN))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_SEARCH_FIELD_LEN))]
    pub location: String,
    #[serde(default)]
    #[validate(length(max = MAX_EXPERIENCE_LEN))]
    pub experience: String,
}

impl ScrapeRequest {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        experience: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            experience: experience.into(),
        }
    }

    /// Trim every field and check the request is runnable.
    ///
    /// Whitespace-only titles or locations count as missing.
    pub fn normalize(self) -> Result<Self, CoreError> {
        let request = Self {
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            experience: self.experience.trim().to_string(),
        };

        if request.title.is_empty() || request.location.is_empty() {
            return Err(CoreError::Validation(
                "Job title and location are required".to_string(),
            ));
        }

        request.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|k| k.to_string())
                .collect();
            fields.sort();
            CoreError::Validation(format!(
                "Fields too long: {} (title and location up to {MAX_SEARCH_FIELD_LEN} characters, experience up to {MAX_EXPERIENCE_LEN})",
                fields.join(", ")
            ))
        })?;

        Ok(request)
    }
}
