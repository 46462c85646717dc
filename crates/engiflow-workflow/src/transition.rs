//! The review state machine.
//!
//! ```text
//!              Approver                    Approver
//!  In Review ───────────► In Progress ───────────► Approved | Rejected
//!      │  Approver                │
//!      ├──────────► Approved | Rejected
//!      │  Commenter               │ Commenter
//!      └──────────► Commented ◄───┘
//! ```
//!
//! `Approved`, `Rejected` and `Commented` are terminal for a revision;
//! only a new revision restarts review.

use engiflow_core::models::document::{DocumentStatus, ReviewerRole};

use crate::error::WorkflowError;

/// A reviewer's request against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    SetStatus {
        status: DocumentStatus,
        comment: String,
    },
    Comment {
        text: String,
    },
}

impl ReviewAction {
    /// Status the document ends in if the action succeeds.
    pub fn target(&self) -> DocumentStatus {
        match self {
            ReviewAction::SetStatus { status, .. } => *status,
            ReviewAction::Comment { .. } => DocumentStatus::Commented,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            ReviewAction::SetStatus { comment, .. } => comment,
            ReviewAction::Comment { text } => text,
        }
    }

    /// Input checks that run before any credential check.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let blank = self.comment().trim().is_empty();
        match self {
            ReviewAction::SetStatus {
                status: DocumentStatus::Rejected,
                ..
            } if blank => Err(WorkflowError::RejectionCommentRequired),
            ReviewAction::SetStatus {
                status: DocumentStatus::Approved,
                ..
            } => Ok(()),
            _ if blank => Err(WorkflowError::CommentRequired),
            _ => Ok(()),
        }
    }
}

/// Statuses a reviewer with `role` may set from `from`.
pub fn allowed_targets(role: ReviewerRole, from: DocumentStatus) -> &'static [DocumentStatus] {
    use DocumentStatus::*;
    match (role, from) {
        (ReviewerRole::Approver, InReview) => &[InProgress, Approved, Rejected],
        (ReviewerRole::Approver, InProgress) => &[Approved, Rejected],
        (ReviewerRole::Commenter, InReview | InProgress) => &[Commented],
        _ => &[],
    }
}

/// Check that `role` may apply `action` to a document in `from`.
pub fn check(
    role: Option<ReviewerRole>,
    from: DocumentStatus,
    action: &ReviewAction,
) -> Result<(), WorkflowError> {
    let role = role.ok_or_else(|| {
        WorkflowError::NotPermitted("only listed reviewers can act on this document".into())
    })?;

    match (role, action) {
        (ReviewerRole::Approver, ReviewAction::Comment { .. }) => {
            return Err(WorkflowError::NotPermitted(
                "approvers record their decision as a status change".into(),
            ));
        }
        (ReviewerRole::Commenter, ReviewAction::SetStatus { .. }) => {
            return Err(WorkflowError::NotPermitted(
                "commenters cannot change the status".into(),
            ));
        }
        (ReviewerRole::Viewer, _) => {
            return Err(WorkflowError::NotPermitted(
                "viewers have read-only access".into(),
            ));
        }
        _ => {}
    }

    let to = action.target();
    if allowed_targets(role, from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { from, to })
    }
}
