/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a single scrape run, assigned when the trigger is admitted.
pub type RunId = uuid::Uuid;
