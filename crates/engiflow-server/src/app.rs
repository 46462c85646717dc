//! One application tab: a session over the shared medium with its sync
//! listener, collaboration bus and services wired to the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use engiflow_core::error::EngiflowResult;
use engiflow_core::insights::{self, CalendarEvent, DashboardSummary, DocumentQuery};
use engiflow_core::models::document::Document;
use engiflow_core::models::user::User;
use engiflow_core::repository::{PaginatedResult, Pagination};
use engiflow_store::repository::{
    StoreDocumentRepository, StoreMessageRepository, StoreNoteRepository,
    StoreNotificationRepository, StoreOrganizationRepository, StoreProjectRepository,
    StoreTaskRepository, StoreUserRepository,
};
use engiflow_store::{Repositories, SeedData, SharedMedium, StorageBackend, TabSession};
use engiflow_sync::{CollaborationBus, NoteAutosave, SyncConfig, SyncListener};
use engiflow_workflow::{
    AccountService, Assistant, LoginInput, PersonalService, ProjectService, RegisterInput,
    TextGenerator, UpdateProfile, WorkflowConfig, WorkflowService,
};
use tokio::task::JoinHandle;
use tracing::info;

pub type Accounts<B> = AccountService<StoreOrganizationRepository<B>, StoreUserRepository<B>>;

pub type Workflow<B, G> = WorkflowService<
    StoreDocumentRepository<B>,
    StoreUserRepository<B>,
    StoreNotificationRepository<B>,
    StoreOrganizationRepository<B>,
    StoreProjectRepository<B>,
    G,
>;

pub type Projects<B> = ProjectService<StoreProjectRepository<B>, StoreDocumentRepository<B>>;

pub type Personal<B, G> = PersonalService<
    StoreTaskRepository<B>,
    StoreNoteRepository<B>,
    StoreMessageRepository<B>,
    StoreNotificationRepository<B>,
    G,
>;

pub struct App<B: StorageBackend, G: TextGenerator + 'static> {
    session: Arc<TabSession<B>>,
    bus: Arc<CollaborationBus<B>>,
    listener: Arc<SyncListener<B>>,
    listener_task: JoinHandle<()>,
    autosave: NoteAutosave<B>,
    pub accounts: Accounts<B>,
    pub workflow: Workflow<B, G>,
    pub projects: Projects<B>,
    pub personal: Personal<B, G>,
}

impl<B: StorageBackend, G: TextGenerator + 'static> App<B, G> {
    /// Open a tab, resume any recorded sign-in and start listening for
    /// other tabs' writes.
    pub async fn open(
        medium: &Arc<SharedMedium<B>>,
        seed: SeedData,
        assistant: Arc<Assistant<G>>,
        workflow: WorkflowConfig,
        sync: SyncConfig,
    ) -> Self {
        let session = TabSession::open(medium, seed).await;
        session.restore().await;

        let bus = CollaborationBus::new(session.clone(), sync.clone());
        let listener = SyncListener::new(session.clone(), bus.clone());
        let listener_task = listener.spawn();
        let autosave = NoteAutosave::new(session.clone(), sync);

        let [a, w, p, s] = std::array::from_fn(|_| Repositories::new(session.collections()));
        let accounts = AccountService::new(a.organizations, a.users, workflow.clone());
        let projects = ProjectService::new(p.projects, p.documents);
        let personal = PersonalService::new(
            s.tasks,
            s.notes,
            s.messages,
            s.notifications,
            assistant.clone(),
        );
        let workflow = WorkflowService::new(
            w.documents,
            w.users,
            w.notifications,
            w.organizations,
            w.projects,
            assistant,
            workflow,
        );

        info!(tab = %session.tab_id(), "Tab opened");
        Self {
            session,
            bus,
            listener,
            listener_task,
            autosave,
            accounts,
            workflow,
            projects,
            personal,
        }
    }

    pub fn session(&self) -> &Arc<TabSession<B>> {
        &self.session
    }

    pub fn collaboration(&self) -> &Arc<CollaborationBus<B>> {
        &self.bus
    }

    pub fn listener(&self) -> &Arc<SyncListener<B>> {
        &self.listener
    }

    pub fn autosave(&self) -> &NoteAutosave<B> {
        &self.autosave
    }

    pub fn current_user(&self) -> EngiflowResult<User> {
        self.session.require_user()
    }

    pub async fn register(&self, input: RegisterInput) -> EngiflowResult<User> {
        let user = self.accounts.register(input).await?;
        self.session.sign_in(user.clone()).await?;
        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> EngiflowResult<User> {
        let user = self.accounts.login(input).await?;
        self.session.sign_in(user.clone()).await?;
        Ok(user)
    }

    pub async fn logout(&self) -> EngiflowResult<()> {
        self.session.sign_out().await?;
        Ok(())
    }

    pub async fn set_password(&self, new_password: &str) -> EngiflowResult<User> {
        let actor = self.current_user()?;
        let user = self.accounts.set_password(&actor, new_password).await?;
        self.session.set_current_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, input: UpdateProfile) -> EngiflowResult<User> {
        let actor = self.current_user()?;
        let user = self.accounts.update_profile(&actor, input).await?;
        self.session.set_current_user(user.clone());
        Ok(user)
    }

    /// Delete one of the user's notes, dropping any auto-save still pending
    /// for it.
    pub async fn delete_note(&self, note_id: &str) -> EngiflowResult<()> {
        let actor = self.current_user()?;
        self.autosave.discard(note_id);
        self.personal.delete_note(&actor, note_id).await
    }

    /// Counts and recent activity over the user's latest revisions.
    pub fn dashboard(&self) -> EngiflowResult<DashboardSummary> {
        let documents = self.session.my_documents()?;
        let refs: Vec<&Document> = documents.iter().collect();
        Ok(insights::dashboard(&refs))
    }

    /// The user's uploads, deadlines and tasks plus holidays, by day.
    pub fn calendar(&self) -> EngiflowResult<BTreeMap<NaiveDate, Vec<CalendarEvent>>> {
        let documents = self.session.my_documents()?;
        let tasks = self.session.my_tasks()?;
        let refs: Vec<&Document> = documents.iter().collect();
        Ok(insights::calendar(&refs, &tasks))
    }

    /// Search every document of the organization.
    pub fn search(
        &self,
        query: &DocumentQuery,
        pagination: &Pagination,
    ) -> EngiflowResult<PaginatedResult<Document>> {
        let documents = self.session.organization_documents()?;
        Ok(insights::search(&documents, query, pagination))
    }
}

impl<B: StorageBackend, G: TextGenerator + 'static> Drop for App<B, G> {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}
