//! Startup errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("demo data error: {0}")]
    Seed(#[from] engiflow_workflow::WorkflowError),
}
