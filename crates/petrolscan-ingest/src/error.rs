use petrolscan_core::StoreError;
use thiserror::Error;

/// Failure to ingest a single observation. Never aborts a whole run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The existing-record lookup failed; nothing was written.
    #[error("lookup of existing record failed: {source}")]
    Lookup {
        #[source]
        source: StoreError,
    },

    /// An insert collided with a concurrent writer and the follow-up lookup
    /// could not resolve the collision.
    #[error("unresolved write conflict for {station_name}: {reason}")]
    Conflict {
        station_name: String,
        reason: String,
    },

    #[error("write failed: {source}")]
    Write {
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// Backend lookup failures leave the store untouched and can be retried
    /// as-is. A row that cannot be decoded stays undecodable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Lookup {
                source: StoreError::Backend(_)
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset was produced by crawler '{found}', expected '{expected}'")]
    StationMismatch { expected: String, found: String },
}
