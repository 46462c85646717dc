//! A tab session: the signed-in user, that tab's cached collections, and
//! the tenant-scoped read accessors every view goes through.

use std::sync::Arc;

use engiflow_core::insights;
use engiflow_core::keys::{LOGGED_IN_USER_KEY, THEME_KEY};
use engiflow_core::models::{
    document::Document, message::ChatMessage, note::Note, notification::Notification,
    organization::Organization, project::Project, task::Task, user::User,
};
use engiflow_core::{EngiflowError, EngiflowResult, TenantScope};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::collections::{Collections, SeedData};
use crate::error::StoreError;
use crate::medium::{SharedMedium, TabId};
use crate::persisted::PersistedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

pub struct TabSession<B: StorageBackend> {
    store: PersistedStore<B>,
    collections: Arc<Collections<B>>,
    current_user: RwLock<Option<User>>,
}

impl<B: StorageBackend> TabSession<B> {
    /// Open a new tab on `medium` and load every collection.
    pub async fn open(medium: &Arc<SharedMedium<B>>, seed: SeedData) -> Arc<Self> {
        let store = PersistedStore::new(medium.open_tab());
        let collections = Arc::new(Collections::load(&store, seed).await);
        Arc::new(Self {
            store,
            collections,
            current_user: RwLock::new(None),
        })
    }

    pub fn tab_id(&self) -> TabId {
        self.store.storage().id()
    }

    pub fn store(&self) -> &PersistedStore<B> {
        &self.store
    }

    pub fn collections(&self) -> &Arc<Collections<B>> {
        &self.collections
    }

    // -----------------------------------------------------------------------
    // Signed-in user
    // -----------------------------------------------------------------------

    /// Resume the session recorded under the logged-in-user key, if any.
    pub async fn restore(&self) -> Option<User> {
        let email: Option<String> = self.store.load(LOGGED_IN_USER_KEY, None).await;
        let user = email.and_then(|email| {
            self.collections
                .users
                .read(|users| users.iter().find(|u| u.has_email(&email)).cloned())
        });
        if let Some(user) = &user {
            info!(email = %user.email, "Session restored");
        }
        *self.current_user.write() = user.clone();
        user
    }

    pub async fn sign_in(&self, user: User) -> Result<(), StoreError> {
        self.store.save(LOGGED_IN_USER_KEY, &user.email).await?;
        debug!(email = %user.email, tab = %self.tab_id(), "Signed in");
        *self.current_user.write() = Some(user);
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        *self.current_user.write() = None;
        self.store.clear(LOGGED_IN_USER_KEY).await
    }

    /// Swap the in-memory user record (after a profile or password change).
    pub fn set_current_user(&self, user: User) {
        *self.current_user.write() = Some(user);
    }

    /// Re-read the signed-in user's record from the users cache.
    pub fn refresh_current_user(&self) {
        let Some(current) = self.current_user() else {
            return;
        };
        let fresh = self.collections.users.read(|users| {
            users
                .iter()
                .find(|u| u.has_email(&current.email) && u.organization_id == current.organization_id)
                .cloned()
        });
        if let Some(fresh) = fresh {
            *self.current_user.write() = Some(fresh);
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub fn require_user(&self) -> EngiflowResult<User> {
        self.current_user().ok_or(EngiflowError::TenantContext)
    }

    pub fn scope(&self) -> EngiflowResult<TenantScope> {
        self.require_user().map(|u| TenantScope::for_user(&u))
    }

    pub fn current_organization(&self) -> Option<Organization> {
        let user = self.current_user()?;
        self.collections.organizations.read(|orgs| {
            orgs.iter()
                .find(|o| o.id == user.organization_id)
                .cloned()
        })
    }

    // -----------------------------------------------------------------------
    // Tenant-scoped reads
    // -----------------------------------------------------------------------

    pub fn organization_users(&self) -> EngiflowResult<Vec<User>> {
        let scope = self.scope()?;
        Ok(scope.filter(self.collections.users.snapshot()))
    }

    pub fn organization_documents(&self) -> EngiflowResult<Vec<Document>> {
        let scope = self.scope()?;
        Ok(scope.filter(self.collections.documents.snapshot()))
    }

    pub fn organization_projects(&self) -> EngiflowResult<Vec<Project>> {
        let scope = self.scope()?;
        Ok(scope.filter(self.collections.projects.snapshot()))
    }

    pub fn organization_messages(&self) -> EngiflowResult<Vec<ChatMessage>> {
        let scope = self.scope()?;
        Ok(scope.filter(self.collections.messages.snapshot()))
    }

    pub fn organization_notifications(&self) -> EngiflowResult<Vec<Notification>> {
        let scope = self.scope()?;
        Ok(scope.filter(self.collections.notifications.snapshot()))
    }

    /// Tasks owned by the signed-in user.
    pub fn my_tasks(&self) -> EngiflowResult<Vec<Task>> {
        let user = self.require_user()?;
        let scope = TenantScope::for_user(&user);
        let mut tasks = scope.filter(self.collections.tasks.snapshot());
        tasks.retain(|t| user.has_email(&t.user_email));
        Ok(tasks)
    }

    /// Notes owned by the signed-in user.
    pub fn my_notes(&self) -> EngiflowResult<Vec<Note>> {
        let user = self.require_user()?;
        let scope = TenantScope::for_user(&user);
        let mut notes = scope.filter(self.collections.notes.snapshot());
        notes.retain(|n| user.has_email(&n.user_email));
        Ok(notes)
    }

    /// Latest revisions the signed-in user uploaded or reviews.
    pub fn my_documents(&self) -> EngiflowResult<Vec<Document>> {
        let user = self.require_user()?;
        let docs = self.organization_documents()?;
        Ok(insights::user_documents(&docs, &user.email)
            .into_iter()
            .cloned()
            .collect())
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    /// Stored theme preference; light when unset or unrecognised.
    pub async fn theme(&self) -> Theme {
        match self.store.storage().get(THEME_KEY).await {
            Ok(Some(raw)) if raw == "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.store
            .storage()
            .set(THEME_KEY, theme.as_str().to_string())
            .await
    }
}
