//! Repository implementations over a tab's cached collections.
//!
//! Every repository holds an `Arc` to the collection it manages, so the
//! repositories of one tab all observe (and write through) the same cache.

mod document;
mod message;
mod note;
mod notification;
mod organization;
mod project;
mod task;
mod user;

pub use document::{SCRATCHPAD_PLACEHOLDER, StoreDocumentRepository};
pub use message::StoreMessageRepository;
pub use note::StoreNoteRepository;
pub use notification::StoreNotificationRepository;
pub use organization::StoreOrganizationRepository;
pub use project::StoreProjectRepository;
pub use task::StoreTaskRepository;
pub use user::StoreUserRepository;

use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::collections::Collections;

/// Fresh record id of the form `<prefix>-<uuid>`.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Every repository of one tab, sharing that tab's caches.
pub struct Repositories<B: StorageBackend> {
    pub organizations: StoreOrganizationRepository<B>,
    pub users: StoreUserRepository<B>,
    pub documents: StoreDocumentRepository<B>,
    pub projects: StoreProjectRepository<B>,
    pub tasks: StoreTaskRepository<B>,
    pub notes: StoreNoteRepository<B>,
    pub messages: StoreMessageRepository<B>,
    pub notifications: StoreNotificationRepository<B>,
}

impl<B: StorageBackend> Repositories<B> {
    pub fn new(collections: &Collections<B>) -> Self {
        Self {
            organizations: StoreOrganizationRepository::new(collections.organizations.clone()),
            users: StoreUserRepository::new(collections.users.clone()),
            documents: StoreDocumentRepository::new(collections.documents.clone()),
            projects: StoreProjectRepository::new(collections.projects.clone()),
            tasks: StoreTaskRepository::new(collections.tasks.clone()),
            notes: StoreNoteRepository::new(collections.notes.clone()),
            messages: StoreMessageRepository::new(collections.messages.clone()),
            notifications: StoreNotificationRepository::new(collections.notifications.clone()),
        }
    }
}
