use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The corpus root itself cannot be listed; fatal for a run.
    #[error("corpus source unavailable: {0}")]
    SourceUnavailable(String),

    /// A single entry could not be read; the entry is skipped.
    #[error("failed to fetch {entry}: {reason}")]
    Fetch { entry: String, reason: String },

    #[error("invalid entry name: {0}")]
    InvalidEntry(String),

    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    Other(String),
}

impl StorageError {
    pub fn fetch(entry: &str, reason: impl ToString) -> Self {
        StorageError::Fetch {
            entry: entry.to_string(),
            reason: reason.to_string(),
        }
    }
}
