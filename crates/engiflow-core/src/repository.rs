//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Every read and every mutation of a
//! tenant-owned collection takes an `org_id` so that no call can observe
//! or touch another organization's records.

use crate::error::EngiflowResult;
use crate::models::{
    document::{Document, NewDocument},
    message::ChatMessage,
    note::Note,
    notification::Notification,
    organization::{CreateOrganization, Organization, Subscription},
    project::{CreateProject, Project, UpdateProject},
    task::{CreateTask, Task},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

impl Pagination {
    /// One-based page number, the way result pages are presented.
    pub fn page(page: u64, per_page: u64) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(per_page),
            limit: per_page,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    pub fn from_vec(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        Self {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

// ---------------------------------------------------------------------------
// Organizations & users
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = EngiflowResult<Organization>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = EngiflowResult<Organization>> + Send;
    /// Case-insensitive, whitespace-trimmed name lookup.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = EngiflowResult<Option<Organization>>> + Send;
    fn update_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> impl Future<Output = EngiflowResult<Organization>> + Send;
    fn list(&self) -> impl Future<Output = EngiflowResult<Vec<Organization>>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken within the organization.
    fn create(&self, input: CreateUser) -> impl Future<Output = EngiflowResult<User>> + Send;
    fn get_by_email(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<User>> + Send;
    /// Whether any organization has a user with this email.
    fn email_registered(&self, email: &str) -> impl Future<Output = EngiflowResult<bool>> + Send;
    fn update(
        &self,
        org_id: &str,
        email: &str,
        input: UpdateUser,
    ) -> impl Future<Output = EngiflowResult<User>> + Send;
    fn list(&self, org_id: &str) -> impl Future<Output = EngiflowResult<Vec<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Documents & projects
// ---------------------------------------------------------------------------

pub trait DocumentRepository: Send + Sync {
    /// Store a new revision. Assigns `version = max(group) + 1` (0 for the
    /// first upload), marks it latest, and clears `is_latest` on every
    /// earlier revision of the same name + project in one write.
    fn create_revision(
        &self,
        org_id: &str,
        input: NewDocument,
    ) -> impl Future<Output = EngiflowResult<Document>> + Send;
    fn get_by_id(
        &self,
        org_id: &str,
        id: &str,
    ) -> impl Future<Output = EngiflowResult<Document>> + Send;
    /// Replace the stored document with the same id.
    fn update(
        &self,
        org_id: &str,
        document: Document,
    ) -> impl Future<Output = EngiflowResult<Document>> + Send;
    fn list(&self, org_id: &str) -> impl Future<Output = EngiflowResult<Vec<Document>>> + Send;
    /// All revisions of a name + project, highest version first.
    fn revisions(
        &self,
        org_id: &str,
        name: &str,
        project_code: Option<&str>,
    ) -> impl Future<Output = EngiflowResult<Vec<Document>>> + Send;
    fn delete_by_project(
        &self,
        org_id: &str,
        project_code: &str,
    ) -> impl Future<Output = EngiflowResult<usize>> + Send;
}

pub trait ProjectRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the code is taken (case-insensitive).
    fn create(&self, input: CreateProject) -> impl Future<Output = EngiflowResult<Project>> + Send;
    fn get_by_code(
        &self,
        org_id: &str,
        code: &str,
    ) -> impl Future<Output = EngiflowResult<Project>> + Send;
    fn update(
        &self,
        org_id: &str,
        id: &str,
        input: UpdateProject,
    ) -> impl Future<Output = EngiflowResult<Project>> + Send;
    fn delete_by_code(
        &self,
        org_id: &str,
        code: &str,
    ) -> impl Future<Output = EngiflowResult<()>> + Send;
    fn list(&self, org_id: &str) -> impl Future<Output = EngiflowResult<Vec<Project>>> + Send;
}

// ---------------------------------------------------------------------------
// Per-user records
// ---------------------------------------------------------------------------

pub trait TaskRepository: Send + Sync {
    fn create(&self, input: CreateTask) -> impl Future<Output = EngiflowResult<Task>> + Send;
    fn toggle(&self, org_id: &str, id: &str) -> impl Future<Output = EngiflowResult<Task>> + Send;
    fn delete(&self, org_id: &str, id: &str) -> impl Future<Output = EngiflowResult<()>> + Send;
    fn list_for_user(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<Vec<Task>>> + Send;
}

pub trait NoteRepository: Send + Sync {
    fn create(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<Note>> + Send;
    fn get_by_id(
        &self,
        org_id: &str,
        id: &str,
    ) -> impl Future<Output = EngiflowResult<Note>> + Send;
    fn update(
        &self,
        org_id: &str,
        id: &str,
        title: String,
        content: String,
    ) -> impl Future<Output = EngiflowResult<Note>> + Send;
    fn delete(&self, org_id: &str, id: &str) -> impl Future<Output = EngiflowResult<()>> + Send;
    fn list_for_user(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<Vec<Note>>> + Send;
}

pub trait MessageRepository: Send + Sync {
    fn create(
        &self,
        org_id: &str,
        sender_email: &str,
        receiver_email: &str,
        text: String,
    ) -> impl Future<Output = EngiflowResult<ChatMessage>> + Send;
    fn list(&self, org_id: &str)
    -> impl Future<Output = EngiflowResult<Vec<ChatMessage>>> + Send;
    /// Messages between two users, oldest first.
    fn conversation(
        &self,
        org_id: &str,
        a: &str,
        b: &str,
    ) -> impl Future<Output = EngiflowResult<Vec<ChatMessage>>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    fn create_many(
        &self,
        notifications: Vec<Notification>,
    ) -> impl Future<Output = EngiflowResult<()>> + Send;
    fn mark_read(&self, org_id: &str, id: &str)
    -> impl Future<Output = EngiflowResult<()>> + Send;
    /// Returns how many notifications changed.
    fn mark_all_read(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<usize>> + Send;
    fn mark_document_read(
        &self,
        org_id: &str,
        document_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<usize>> + Send;
    fn list_for_user(
        &self,
        org_id: &str,
        email: &str,
    ) -> impl Future<Output = EngiflowResult<Vec<Notification>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_one_based() {
        let p = Pagination::page(3, 10);
        assert_eq!(p.offset, 20);
        assert_eq!(p.limit, 10);
        assert_eq!(Pagination::page(0, 10).offset, 0);
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let p = Pagination::page(u64::MAX, 50);
        assert_eq!(p.offset, u64::MAX);
        let result = PaginatedResult::from_vec(vec![1, 2, 3], &p);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 3);
    }

    #[test]
    fn paginated_result_counts_pages() {
        let result = PaginatedResult::from_vec((0..23).collect(), &Pagination::page(3, 10));
        assert_eq!(result.items, vec![20, 21, 22]);
        assert_eq!(result.total, 23);
        assert_eq!(result.total_pages(), 3);
    }
}
