//! EngiFlow Workflow: document review state machine with e-signatures,
//! account flows, workspace administration and the AI assistant.

pub mod account;
pub mod assistant;
pub mod config;
pub mod error;
pub mod password;
pub mod personal;
pub mod project;
pub mod service;
pub mod transition;

pub use account::{AccountService, LoginInput, RegisterInput, UpdateProfile};
pub use assistant::{Assistant, AssistantError, GeminiClient, NoteFormat, TextGenerator};
pub use config::WorkflowConfig;
pub use error::WorkflowError;
pub use personal::PersonalService;
pub use project::{ProjectInput, ProjectService};
pub use service::{
    EMAIL_WARNING, NOTIFICATION_WARNING, PendingEmail, ReviewOutcome, UploadOutcome,
    UploadRequest, WorkflowService, has_signed_revision,
};
pub use transition::ReviewAction;
