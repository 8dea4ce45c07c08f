#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Result file '{0}' not found")]
    NotFound(String),

    #[error("Invalid result file name '{0}'")]
    InvalidName(String),

    #[error("Result file '{file}' is not a valid job list: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Result store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
