//! Review workflow service: uploads, e-signed review actions and the
//! notifications they produce.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use engiflow_core::error::EngiflowResult;
use engiflow_core::models::document::{
    Document, DocumentDiscipline, DocumentStatus, E_SIGNED_PREFIX, HistoryEntry, NewDocument,
    Reviewer,
};
use engiflow_core::models::notification::Notification;
use engiflow_core::models::user::{User, same_email};
use engiflow_core::repository::{
    DocumentRepository, NotificationRepository, OrganizationRepository, ProjectRepository,
    UserRepository,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::assistant::{Assistant, TextGenerator};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::password;
use crate::transition::{self, ReviewAction};

/// Shown when a change committed but its e-mail could not be drafted.
pub const EMAIL_WARNING: &str =
    "The action was successful, but there was an error generating the notification email.";

/// Shown when a change committed but its in-app notifications could not be
/// stored.
pub const NOTIFICATION_WARNING: &str =
    "The action was successful, but notifications could not be delivered.";

/// Input for a new document revision.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original file name, extension included.
    pub file_name: String,
    pub project_code: String,
    pub discipline: Option<DocumentDiscipline>,
    pub reviewers: Vec<Reviewer>,
    /// Optional document lock. Blank means unlocked.
    pub password: Option<String>,
    /// Base64 data URL of the file.
    pub file_url: Option<String>,
    pub reminder_date: Option<NaiveDate>,
}

/// An e-mail being drafted in the background.
#[derive(Debug)]
pub struct PendingEmail {
    recipients: Vec<String>,
    handle: JoinHandle<Option<String>>,
}

impl PendingEmail {
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// The drafted text, or [`EMAIL_WARNING`] if drafting failed.
    pub async fn outcome(self) -> Result<String, &'static str> {
        match self.handle.await {
            Ok(Some(draft)) => Ok(draft),
            Ok(None) => Err(EMAIL_WARNING),
            Err(e) => {
                error!(error = %e, "E-mail drafting task failed");
                Err(EMAIL_WARNING)
            }
        }
    }
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub document: Document,
    pub review_email: PendingEmail,
}

#[derive(Debug)]
pub struct ReviewOutcome {
    pub document: Document,
    /// Emails that received an in-app notification.
    pub notified: Vec<String>,
    /// [`NOTIFICATION_WARNING`] when the notifications were not stored.
    pub warning: Option<&'static str>,
    /// Present only when someone was notified.
    pub status_email: Option<PendingEmail>,
}

/// Whether `email` has e-signed the current revision of `document`.
pub fn has_signed_revision(document: &Document, email: &str) -> bool {
    document.history.iter().any(|entry| {
        same_email(&entry.user_email, email) && entry.is_e_signed() && entry.version == document.version
    })
}

/// File type label: the upper-cased extension, `FILE` when there is none.
fn doc_type(file_name: &str) -> String {
    match file_name.rsplit('.').next().map(str::trim) {
        Some(ext) if !ext.is_empty() => ext.to_uppercase(),
        _ => "FILE".to_string(),
    }
}

/// Review workflow service.
///
/// Generic over repository implementations so that the workflow layer
/// has no dependency on the store crate.
pub struct WorkflowService<D, U, N, O, P, G>
where
    D: DocumentRepository,
    U: UserRepository,
    N: NotificationRepository,
    O: OrganizationRepository,
    P: ProjectRepository,
    G: TextGenerator + 'static,
{
    documents: D,
    users: U,
    notifications: N,
    organizations: O,
    projects: P,
    assistant: Arc<Assistant<G>>,
    config: WorkflowConfig,
}

impl<D, U, N, O, P, G> WorkflowService<D, U, N, O, P, G>
where
    D: DocumentRepository,
    U: UserRepository,
    N: NotificationRepository,
    O: OrganizationRepository,
    P: ProjectRepository,
    G: TextGenerator + 'static,
{
    pub fn new(
        documents: D,
        users: U,
        notifications: N,
        organizations: O,
        projects: P,
        assistant: Arc<Assistant<G>>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            documents,
            users,
            notifications,
            organizations,
            projects,
            assistant,
            config,
        }
    }

    /// Store a new revision and start drafting the review request e-mail.
    pub async fn upload(&self, actor: &User, request: UploadRequest) -> EngiflowResult<UploadOutcome> {
        let org_id = actor.organization_id.as_str();

        // 1. Validate input.
        let file_name = request.file_name.trim();
        if file_name.is_empty() {
            return Err(WorkflowError::MissingField("file").into());
        }
        let project_code = request.project_code.trim();
        if project_code.is_empty() {
            return Err(WorkflowError::MissingField("project").into());
        }
        let discipline = request
            .discipline
            .ok_or(WorkflowError::MissingField("discipline"))?;
        let reviewers: Vec<Reviewer> = request
            .reviewers
            .into_iter()
            .map(|r| Reviewer {
                email: r.email.trim().to_string(),
                ..r
            })
            .filter(|r| !r.email.is_empty())
            .collect();
        if reviewers.is_empty() {
            return Err(WorkflowError::MissingField("at least one reviewer").into());
        }
        let project = self.projects.get_by_code(org_id, project_code).await?;

        // 2. Hash the optional document lock.
        let password_hash = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => Some(password::hash_password(p, self.config.pepper.as_deref())?),
            None => None,
        };

        // 3. Commit the revision.
        let document = self
            .documents
            .create_revision(
                org_id,
                NewDocument {
                    name: file_name.to_string(),
                    doc_type: doc_type(file_name),
                    uploaded_by: actor.snapshot(),
                    reviewers,
                    password_hash,
                    project_code: Some(project.project_code.clone()),
                    file_url: request.file_url,
                    discipline,
                    reminder_date: request.reminder_date,
                },
            )
            .await?;
        info!(
            org_id,
            doc_id = %document.id,
            version = document.version,
            "Document revision uploaded"
        );

        // 4. Draft the review request.
        let recipients: Vec<String> = document.reviewers.iter().map(|r| r.email.clone()).collect();
        let assistant = Arc::clone(&self.assistant);
        let name = document.name.clone();
        let reviewers = document.reviewers.clone();
        let project_name = project.name;
        let handle = tokio::spawn(async move {
            match assistant
                .review_email(&name, &reviewers, Some(&project_name))
                .await
            {
                Ok(draft) => {
                    info!(doc = %name, "Review e-mail drafted");
                    Some(draft)
                }
                Err(e) => {
                    error!(error = %e, doc = %name, "Failed to generate review e-mail");
                    None
                }
            }
        });

        Ok(UploadOutcome {
            document,
            review_email: PendingEmail { recipients, handle },
        })
    }

    /// E-signed status change by an approver.
    pub async fn request_status_change(
        &self,
        actor: &User,
        doc_id: &str,
        status: DocumentStatus,
        comment: &str,
        password: &str,
    ) -> EngiflowResult<ReviewOutcome> {
        let action = ReviewAction::SetStatus {
            status,
            comment: comment.to_string(),
        };
        self.sign(actor, doc_id, action, password).await
    }

    /// E-signed comment by a commenter.
    pub async fn comment(
        &self,
        actor: &User,
        doc_id: &str,
        text: &str,
        password: &str,
    ) -> EngiflowResult<ReviewOutcome> {
        let action = ReviewAction::Comment {
            text: text.to_string(),
        };
        self.sign(actor, doc_id, action, password).await
    }

    async fn sign(
        &self,
        actor: &User,
        doc_id: &str,
        action: ReviewAction,
        password: &str,
    ) -> EngiflowResult<ReviewOutcome> {
        let org_id = actor.organization_id.as_str();

        // 1. Input and transition rules. Nothing below runs if these fail.
        action.validate()?;
        let mut document = self.documents.get_by_id(org_id, doc_id).await?;
        transition::check(document.reviewer_role(&actor.email), document.status, &action)?;

        // 2. Re-authenticate against the stored hash.
        let signer = self.users.get_by_email(org_id, &actor.email).await?;
        let hash = signer
            .password_hash
            .as_deref()
            .ok_or(WorkflowError::SignatureRejected)?;
        if !password::verify_password(password, hash, self.config.pepper.as_deref())? {
            warn!(org_id, doc_id, user = %actor.email, "E-signature rejected");
            return Err(WorkflowError::SignatureRejected.into());
        }

        // 3. Record the signed entry.
        let status = action.target();
        let comment = action.comment().trim();
        let signed_comment = if comment.is_empty() {
            "Status updated."
        } else {
            comment
        };
        document.status = status;
        document.history.insert(
            0,
            HistoryEntry {
                status,
                date: Utc::now(),
                user: actor.name.clone(),
                user_email: actor.email.clone(),
                comment: format!("{E_SIGNED_PREFIX}{signed_comment}"),
                version: document.version,
            },
        );
        let document = self.documents.update(org_id, document).await?;
        info!(org_id, doc_id, status = %status, user = %actor.email, "E-signed review recorded");

        // 4. Notify the uploader and known reviewers, never the actor. The
        // change is committed from here on, so delivery problems only warn.
        let message = match &action {
            ReviewAction::SetStatus { .. } => format!(
                "{} has set the status of \"{}\" to {}.",
                actor.name, document.name, status
            ),
            ReviewAction::Comment { .. } => {
                format!("{} has commented on \"{}\".", actor.name, document.name)
            }
        };
        let mut warning = None;
        let recipients = match self.recipients(org_id, actor, &document).await {
            Ok(recipients) => recipients,
            Err(e) => {
                error!(error = %e, org_id, doc_id, "Failed to resolve notification recipients");
                warning = Some(NOTIFICATION_WARNING);
                Vec::new()
            }
        };
        let now = Utc::now();
        let batch: Vec<Notification> = recipients
            .iter()
            .map(|email| Notification {
                id: format!("notif-{}", Uuid::new_v4().simple()),
                recipient_email: email.clone(),
                document_id: document.id.clone(),
                document_name: document.name.clone(),
                message: message.clone(),
                timestamp: now,
                is_read: false,
                organization_id: org_id.to_string(),
            })
            .collect();
        let mut notified = recipients.clone();
        if !batch.is_empty() {
            if let Err(e) = self.notifications.create_many(batch).await {
                error!(error = %e, org_id, doc_id, "Failed to store notifications");
                warning = Some(NOTIFICATION_WARNING);
                notified.clear();
            }
        }

        // 5. Draft the status e-mail. Failure never undoes the change.
        let status_email = if recipients.is_empty() {
            None
        } else {
            let assistant = Arc::clone(&self.assistant);
            let name = document.name.clone();
            let updated_by = actor.name.clone();
            let raw_comment = action.comment().to_string();
            let participants = recipients.clone();
            let handle = tokio::spawn(async move {
                match assistant
                    .status_update_email(
                        &name,
                        status,
                        &updated_by,
                        Some(&raw_comment),
                        &participants,
                    )
                    .await
                {
                    Ok(draft) => {
                        info!(doc = %name, to = %participants.join(", "), "Status e-mail drafted");
                        Some(draft)
                    }
                    Err(e) => {
                        error!(error = %e, doc = %name, "Failed to generate status update e-mail");
                        None
                    }
                }
            });
            Some(PendingEmail {
                recipients: recipients.clone(),
                handle,
            })
        };

        Ok(ReviewOutcome {
            document,
            notified,
            warning,
            status_email,
        })
    }

    /// Uploader plus reviewers who are members of the organization, each
    /// once, without the actor. Reviewer addresses resolve to the member's
    /// stored email.
    async fn recipients(
        &self,
        org_id: &str,
        actor: &User,
        document: &Document,
    ) -> EngiflowResult<Vec<String>> {
        let members = self.users.list(org_id).await?;
        let mut recipients = vec![document.uploaded_by.email.clone()];
        recipients.extend(document.reviewers.iter().filter_map(|reviewer| {
            members
                .iter()
                .find(|u| u.has_email(&reviewer.email))
                .map(|u| u.email.clone())
        }));
        let mut seen = std::collections::HashSet::new();
        recipients
            .retain(|email| !actor.has_email(email) && seen.insert(email.to_ascii_lowercase()));
        Ok(recipients)
    }

    /// Check a document's lock password. Unlocked documents always open.
    pub async fn unlock_document(
        &self,
        actor: &User,
        doc_id: &str,
        password: &str,
    ) -> EngiflowResult<Document> {
        let document = self
            .documents
            .get_by_id(&actor.organization_id, doc_id)
            .await?;
        if let Some(hash) = document.password_hash.as_deref() {
            if !password::verify_password(password, hash, self.config.pepper.as_deref())? {
                return Err(WorkflowError::DocumentLocked.into());
            }
        }
        Ok(document)
    }

    /// Open a document and mark the actor's notifications about it as read.
    pub async fn open_document(&self, actor: &User, doc_id: &str) -> EngiflowResult<Document> {
        let document = self
            .documents
            .get_by_id(&actor.organization_id, doc_id)
            .await?;
        self.notifications
            .mark_document_read(&actor.organization_id, doc_id, &actor.email)
            .await?;
        Ok(document)
    }

    pub async fn set_reminder(
        &self,
        actor: &User,
        doc_id: &str,
        date: NaiveDate,
    ) -> EngiflowResult<Document> {
        let mut document = self
            .documents
            .get_by_id(&actor.organization_id, doc_id)
            .await?;
        document.reminder_date = Some(date);
        self.documents.update(&actor.organization_id, document).await
    }

    /// Every revision sharing the document's name and project, newest first.
    pub async fn revisions(&self, actor: &User, doc_id: &str) -> EngiflowResult<Vec<Document>> {
        let document = self
            .documents
            .get_by_id(&actor.organization_id, doc_id)
            .await?;
        self.documents
            .revisions(
                &actor.organization_id,
                &document.name,
                document.project_code.as_deref(),
            )
            .await
    }

    /// AI summary of a document's review history. Pro only.
    pub async fn summarize(&self, actor: &User, doc_id: &str) -> EngiflowResult<String> {
        let organization = self.organizations.get_by_id(&actor.organization_id).await?;
        if !organization.is_pro() {
            return Err(WorkflowError::ProPlanRequired {
                feature: "AI summary",
            }
            .into());
        }
        let document = self
            .documents
            .get_by_id(&actor.organization_id, doc_id)
            .await?;
        let summary = self
            .assistant
            .document_summary(&document.name, &document.history)
            .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engiflow_core::models::user::{UserRole, UserStatus};

    #[test]
    fn doc_type_uses_extension() {
        assert_eq!(doc_type("Spec_A.pdf"), "PDF");
        assert_eq!(doc_type("plan.v2.dwg"), "DWG");
        assert_eq!(doc_type("trailing."), "FILE");
    }

    #[test]
    fn signed_revision_requires_matching_version() {
        let user = User {
            name: "Rita".into(),
            email: "r1@example.com".into(),
            password_hash: None,
            photo_url: None,
            role: UserRole::Member,
            organization_id: "org-1".into(),
            status: UserStatus::Active,
        };
        let entry = |comment: &str, version| HistoryEntry {
            status: DocumentStatus::Approved,
            date: Utc::now(),
            user: user.name.clone(),
            user_email: user.email.clone(),
            comment: comment.into(),
            version,
        };
        let mut document = Document {
            id: "doc-1".into(),
            name: "Spec_A.pdf".into(),
            doc_type: "PDF".into(),
            uploaded_by: user.snapshot(),
            upload_date: Utc::now(),
            status: DocumentStatus::Approved,
            reviewers: vec![],
            password_hash: None,
            history: vec![entry("[E-signed] ok", 0)],
            reminder_date: None,
            project_code: None,
            version: 1,
            is_latest: true,
            file_url: None,
            discipline: DocumentDiscipline::Civil,
            organization_id: "org-1".into(),
            scratchpad_content: String::new(),
        };
        assert!(!has_signed_revision(&document, "r1@example.com"));

        document.history.insert(0, entry("unsigned note", 1));
        assert!(!has_signed_revision(&document, "r1@example.com"));

        document.history.insert(0, entry("[E-signed] Status updated.", 1));
        assert!(has_signed_revision(&document, "r1@example.com"));
        assert!(!has_signed_revision(&document, "u1@example.com"));
    }
}
