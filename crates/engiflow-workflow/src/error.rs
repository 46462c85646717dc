//! Workflow error types.

use engiflow_core::error::EngiflowError;
use engiflow_core::models::document::DocumentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid email or password for this organization")]
    InvalidCredentials,

    #[error("invalid password, signature rejected")]
    SignatureRejected,

    #[error("invalid document password")]
    DocumentLocked,

    #[error("a comment is required for rejection")]
    RejectionCommentRequired,

    #[error("comment cannot be empty")]
    CommentRequired,

    #[error("cannot move a document from {from} to {to}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("{0}")]
    NotPermitted(String),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("organization member limit of {limit} reached")]
    MemberLimitReached { limit: u32 },

    #[error("{feature} requires the Pro plan")]
    ProPlanRequired { feature: &'static str },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<WorkflowError> for EngiflowError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidCredentials
            | WorkflowError::SignatureRejected
            | WorkflowError::DocumentLocked => EngiflowError::AuthenticationFailed {
                reason: err.to_string(),
            },
            WorkflowError::RejectionCommentRequired
            | WorkflowError::CommentRequired
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::PasswordTooShort { .. }
            | WorkflowError::MissingField(_) => EngiflowError::Validation {
                message: err.to_string(),
            },
            WorkflowError::NotPermitted(_)
            | WorkflowError::MemberLimitReached { .. }
            | WorkflowError::ProPlanRequired { .. } => EngiflowError::AuthorizationDenied {
                reason: err.to_string(),
            },
            WorkflowError::Crypto(msg) => EngiflowError::Internal(msg),
        }
    }
}
