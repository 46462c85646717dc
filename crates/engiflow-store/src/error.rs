//! Storage-specific error types and conversions.

use engiflow_core::error::EngiflowError;

/// Storage-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization failed for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for EngiflowError {
    fn from(err: StoreError) -> Self {
        EngiflowError::Storage(err.to_string())
    }
}
