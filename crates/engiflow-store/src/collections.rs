//! The full set of durable collections held by one tab.

use std::sync::Arc;

use engiflow_core::keys::CollectionKey;
use engiflow_core::models::{
    document::Document, message::ChatMessage, note::Note, notification::Notification,
    organization::Organization, project::Project, task::Task, user::User,
};
use tracing::info;

use crate::backend::StorageBackend;
use crate::collection::CachedCollection;
use crate::persisted::PersistedStore;

/// Initial contents used for any collection that is absent (or unreadable)
/// in storage.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub organizations: Vec<Organization>,
    pub users: Vec<User>,
    pub documents: Vec<Document>,
    pub projects: Vec<Project>,
}

pub struct Collections<B: StorageBackend> {
    pub organizations: Arc<CachedCollection<B, Organization>>,
    pub users: Arc<CachedCollection<B, User>>,
    pub documents: Arc<CachedCollection<B, Document>>,
    pub projects: Arc<CachedCollection<B, Project>>,
    pub tasks: Arc<CachedCollection<B, Task>>,
    pub notes: Arc<CachedCollection<B, Note>>,
    pub messages: Arc<CachedCollection<B, ChatMessage>>,
    pub notifications: Arc<CachedCollection<B, Notification>>,
}

impl<B: StorageBackend> Collections<B> {
    pub async fn load(store: &PersistedStore<B>, seed: SeedData) -> Self {
        let collections = Self {
            organizations: Arc::new(
                CachedCollection::load(
                    store.clone(),
                    CollectionKey::Organizations,
                    seed.organizations,
                )
                .await,
            ),
            users: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Users, seed.users).await,
            ),
            documents: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Documents, seed.documents)
                    .await,
            ),
            projects: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Projects, seed.projects)
                    .await,
            ),
            tasks: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Tasks, Vec::new()).await,
            ),
            notes: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Notes, Vec::new()).await,
            ),
            messages: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Messages, Vec::new()).await,
            ),
            notifications: Arc::new(
                CachedCollection::load(store.clone(), CollectionKey::Notifications, Vec::new())
                    .await,
            ),
        };

        info!(
            organizations = collections.organizations.len(),
            users = collections.users.len(),
            documents = collections.documents.len(),
            projects = collections.projects.len(),
            "Collections loaded"
        );
        collections
    }

    /// Fully replace one collection from its serialized form.
    ///
    /// Returns the number of items now cached.
    pub fn replace_from_json(&self, key: CollectionKey, raw: &str) -> Result<usize, serde_json::Error> {
        match key {
            CollectionKey::Organizations => self.organizations.replace_from_json(raw),
            CollectionKey::Users => self.users.replace_from_json(raw),
            CollectionKey::Documents => self.documents.replace_from_json(raw),
            CollectionKey::Projects => self.projects.replace_from_json(raw),
            CollectionKey::Tasks => self.tasks.replace_from_json(raw),
            CollectionKey::Notes => self.notes.replace_from_json(raw),
            CollectionKey::Messages => self.messages.replace_from_json(raw),
            CollectionKey::Notifications => self.notifications.replace_from_json(raw),
        }
    }

    /// Re-read every collection from storage.
    pub async fn reload_all(&self) {
        self.organizations.reload().await;
        self.users.reload().await;
        self.documents.reload().await;
        self.projects.reload().await;
        self.tasks.reload().await;
        self.notes.reload().await;
        self.messages.reload().await;
        self.notifications.reload().await;
    }
}
