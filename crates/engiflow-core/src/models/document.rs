//! Document domain model: revisions, reviewers and review history.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::user::{UserSnapshot, same_email};

/// Prefix marking a history comment as password-attested.
pub const E_SIGNED_PREFIX: &str = "[E-signed] ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "In Progress")]
    InProgress,
    Approved,
    Rejected,
    Commented,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 5] = [
        DocumentStatus::Approved,
        DocumentStatus::InReview,
        DocumentStatus::Rejected,
        DocumentStatus::Commented,
        DocumentStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::InReview => "In Review",
            DocumentStatus::InProgress => "In Progress",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
            DocumentStatus::Commented => "Commented",
        }
    }

    /// Reviewers may still act on the document.
    pub fn is_open(&self) -> bool {
        matches!(self, DocumentStatus::InReview | DocumentStatus::InProgress)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewerRole {
    Approver,
    Commenter,
    Viewer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentDiscipline {
    Civil,
    Structural,
    Mechanical,
    Electrical,
    #[serde(rename = "Control & Instruments")]
    ControlAndInstruments,
    General,
    Contract,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reviewer {
    pub email: String,
    pub role: ReviewerRole,
}

/// One immutable line of a document's review trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub status: DocumentStatus,
    pub date: DateTime<Utc>,
    /// Display name of the actor.
    pub user: String,
    pub user_email: String,
    pub comment: String,
    pub version: u32,
}

impl HistoryEntry {
    pub fn is_e_signed(&self) -> bool {
        self.comment.starts_with(E_SIGNED_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    /// File type label, e.g. `PDF`.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Snapshot of the uploader at upload time.
    pub uploaded_by: UserSnapshot,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub reviewers: Vec<Reviewer>,
    /// Argon2id hash of the optional document-level lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Newest entry first.
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    pub version: u32,
    pub is_latest: bool,
    /// Base64 data URL of the uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub discipline: DocumentDiscipline,
    pub organization_id: String,
    #[serde(default)]
    pub scratchpad_content: String,
}

impl Document {
    /// Role of `email` on this document, if they are a listed reviewer.
    pub fn reviewer_role(&self, email: &str) -> Option<ReviewerRole> {
        self.reviewers
            .iter()
            .find(|r| same_email(&r.email, email))
            .map(|r| r.role)
    }

    /// Whether this document and `other` are revisions of the same file.
    pub fn same_revision_group(&self, name: &str, project_code: Option<&str>) -> bool {
        self.name == name && self.project_code.as_deref() == project_code
    }

    pub fn involves(&self, email: &str) -> bool {
        self.uploaded_by.has_email(email)
            || self.reviewers.iter().any(|r| same_email(&r.email, email))
    }
}

/// Fields supplied by the uploader. Id, status, version, history and
/// tenant are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: String,
    pub uploaded_by: UserSnapshot,
    pub reviewers: Vec<Reviewer>,
    pub password_hash: Option<String>,
    pub project_code: Option<String>,
    pub file_url: Option<String>,
    pub discipline: DocumentDiscipline,
    pub reminder_date: Option<NaiveDate>,
}
