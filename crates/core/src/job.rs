//! Job record model as emitted by the external scraper.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single job listing.
///
/// Records carry no identity; order and uniqueness are whatever the
/// scraper wrote. Fields the scraper adds beyond the five known ones
/// (for example `source`) are kept in `extra` so serving a file does not
/// drop them. The scraper writes `null` when a page lacks a value; such
/// fields read as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_posted: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    /// Build a record with only the five known fields set.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        date_posted: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            date_posted: date_posted.into(),
            link: link.into(),
            extra: Map::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
