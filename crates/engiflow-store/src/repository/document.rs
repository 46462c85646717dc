//! Cached-collection implementation of [`DocumentRepository`].
//!
//! Revisions of a document share its name and project code. Creating a
//! revision computes the next version and demotes every earlier revision in
//! the same whole-collection write, so at most one revision per group is
//! ever persisted as latest.

use std::sync::Arc;

use chrono::Utc;
use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::document::{Document, DocumentStatus, HistoryEntry, NewDocument};
use engiflow_core::repository::DocumentRepository;
use tracing::info;

use super::new_id;
use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

/// Initial scratchpad text of every new revision.
pub const SCRATCHPAD_PLACEHOLDER: &str =
    "Welcome to the collaborative scratchpad! Type your notes here.";

pub struct StoreDocumentRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Document>>,
}

impl<B: StorageBackend> StoreDocumentRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Document>>) -> Self {
        Self { collection }
    }

    /// Replace a document in this tab's cache only.
    ///
    /// Used for state that another tab already persisted and merely
    /// announced, such as a scratchpad broadcast.
    pub fn update_cached(&self, org_id: &str, id: &str, f: impl FnOnce(&mut Document)) -> bool {
        let mut found = false;
        self.collection.update_cached(|docs| {
            if let Some(doc) = docs
                .iter_mut()
                .find(|d| d.id == id && d.organization_id == org_id)
            {
                f(doc);
                found = true;
            }
        });
        found
    }
}

impl<B: StorageBackend> DocumentRepository for StoreDocumentRepository<B> {
    async fn create_revision(&self, org_id: &str, input: NewDocument) -> EngiflowResult<Document> {
        let doc = self
            .collection
            .mutate(move |docs| {
                let project_code = input.project_code.as_deref();
                let mut previous: Option<u32> = None;
                for doc in docs.iter_mut().filter(|d| {
                    d.organization_id == org_id && d.same_revision_group(&input.name, project_code)
                }) {
                    previous = Some(previous.map_or(doc.version, |v| v.max(doc.version)));
                    doc.is_latest = false;
                }
                let version = previous.map_or(0, |v| v + 1);

                let now = Utc::now();
                let doc = Document {
                    id: new_id("doc"),
                    history: vec![HistoryEntry {
                        status: DocumentStatus::InReview,
                        date: now,
                        user: input.uploaded_by.name.clone(),
                        user_email: input.uploaded_by.email.clone(),
                        comment: format!("Document Revision {version} created and sent for review."),
                        version,
                    }],
                    name: input.name,
                    doc_type: input.doc_type,
                    uploaded_by: input.uploaded_by,
                    upload_date: now,
                    status: DocumentStatus::InReview,
                    reviewers: input.reviewers,
                    password_hash: input.password_hash,
                    reminder_date: input.reminder_date,
                    project_code: input.project_code,
                    version,
                    is_latest: true,
                    file_url: input.file_url,
                    discipline: input.discipline,
                    organization_id: org_id.to_string(),
                    scratchpad_content: SCRATCHPAD_PLACEHOLDER.to_string(),
                };
                docs.insert(0, doc.clone());
                Ok(doc)
            })
            .await?;

        info!(
            doc_id = %doc.id,
            name = %doc.name,
            version = doc.version,
            org_id,
            "Document revision created"
        );
        Ok(doc)
    }

    async fn get_by_id(&self, org_id: &str, id: &str) -> EngiflowResult<Document> {
        self.collection
            .read(|docs| {
                docs.iter()
                    .find(|d| d.id == id && d.organization_id == org_id)
                    .cloned()
            })
            .ok_or_else(|| EngiflowError::not_found("document", id))
    }

    async fn update(&self, org_id: &str, document: Document) -> EngiflowResult<Document> {
        if document.organization_id != org_id {
            return Err(EngiflowError::not_found("document", document.id));
        }
        self.collection
            .mutate(move |docs| {
                let slot = docs
                    .iter_mut()
                    .find(|d| d.id == document.id && d.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("document", document.id.as_str()))?;
                *slot = document.clone();
                Ok(document)
            })
            .await
    }

    async fn list(&self, org_id: &str) -> EngiflowResult<Vec<Document>> {
        Ok(self.collection.read(|docs| {
            docs.iter()
                .filter(|d| d.organization_id == org_id)
                .cloned()
                .collect()
        }))
    }

    async fn revisions(
        &self,
        org_id: &str,
        name: &str,
        project_code: Option<&str>,
    ) -> EngiflowResult<Vec<Document>> {
        let mut revisions: Vec<Document> = self.collection.read(|docs| {
            docs.iter()
                .filter(|d| d.organization_id == org_id && d.same_revision_group(name, project_code))
                .cloned()
                .collect()
        });
        revisions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(revisions)
    }

    async fn delete_by_project(&self, org_id: &str, project_code: &str) -> EngiflowResult<usize> {
        let removed = self
            .collection
            .mutate(|docs| {
                let before = docs.len();
                docs.retain(|d| {
                    !(d.organization_id == org_id
                        && d.project_code
                            .as_deref()
                            .is_some_and(|code| code.eq_ignore_ascii_case(project_code)))
                });
                Ok(before - docs.len())
            })
            .await?;

        info!(org_id, project_code, removed, "Project documents deleted");
        Ok(removed)
    }
}
