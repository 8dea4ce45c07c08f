//! Listing and reading of result files.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use jobscrape_core::job::JobRecord;
use jobscrape_core::naming::{self, ResultFileName};

use crate::error::StoreError;

/// Read-only view over the scraper's output directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Result files in the output directory, most recent first.
    ///
    /// Recency is the timestamp encoded in the filename when it has one,
    /// else the file's modification time; ties break on name, descending.
    /// A missing directory means "no results yet" and yields an empty list.
    pub async fn list_result_files(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<(NaiveDateTime, String)> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !naming::is_result_file(&name) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let encoded = ResultFileName::parse(&name).and_then(|parsed| parsed.timestamp());
            let key = match encoded {
                Some(ts) => ts,
                None => {
                    let modified = metadata.modified()?;
                    DateTime::<Local>::from(modified).naive_local()
                }
            };
            files.push((key, name));
        }

        files.sort_by(|a, b| b.cmp(a));
        Ok(files.into_iter().map(|(_, name)| name).collect())
    }

    /// Most recent result file, if any.
    pub async fn latest(&self) -> Result<Option<String>, StoreError> {
        Ok(self.list_result_files().await?.into_iter().next())
    }

    /// Whether `file_name` is currently listed.
    pub async fn contains(&self, file_name: &str) -> Result<bool, StoreError> {
        Ok(self
            .list_result_files()
            .await?
            .iter()
            .any(|name| name == file_name))
    }

    /// Read and parse one result file.
    pub async fn read_result_file(&self, file_name: &str) -> Result<Vec<JobRecord>, StoreError> {
        if !naming::is_safe_file_name(file_name) {
            return Err(StoreError::InvalidName(file_name.to_string()));
        }

        let bytes = match tokio::fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(file = %file_name, error = %source, "Corrupt result file");
            StoreError::Parse {
                file: file_name.to_string(),
                source,
            }
        })
    }

    /// Latest file name together with its records.
    pub async fn read_latest(&self) -> Result<Option<(String, Vec<JobRecord>)>, StoreError> {
        match self.latest().await? {
            Some(name) => {
                let jobs = self.read_result_file(&name).await?;
                Ok(Some((name, jobs)))
            }
            None => Ok(None),
        }
    }

    /// Check the output directory can be listed.
    ///
    /// An absent directory is healthy: the scraper creates it on first run.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.list_result_files().await.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
