//! Per-user records: calendar tasks, notes, chat and notifications.

use std::sync::Arc;

use chrono::NaiveDate;
use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::message::ChatMessage;
use engiflow_core::models::note::Note;
use engiflow_core::models::notification::Notification;
use engiflow_core::models::task::{CreateTask, Task, TaskPriority};
use engiflow_core::models::user::User;
use engiflow_core::repository::{
    MessageRepository, NoteRepository, NotificationRepository, TaskRepository,
};
use tracing::debug;

use crate::assistant::{Assistant, NoteFormat, TextGenerator};
use crate::error::WorkflowError;

pub struct PersonalService<T, Nt, M, N, G>
where
    T: TaskRepository,
    Nt: NoteRepository,
    M: MessageRepository,
    N: NotificationRepository,
    G: TextGenerator,
{
    tasks: T,
    notes: Nt,
    messages: M,
    notifications: N,
    assistant: Arc<Assistant<G>>,
}

impl<T, Nt, M, N, G> PersonalService<T, Nt, M, N, G>
where
    T: TaskRepository,
    Nt: NoteRepository,
    M: MessageRepository,
    N: NotificationRepository,
    G: TextGenerator,
{
    pub fn new(
        tasks: T,
        notes: Nt,
        messages: M,
        notifications: N,
        assistant: Arc<Assistant<G>>,
    ) -> Self {
        Self {
            tasks,
            notes,
            messages,
            notifications,
            assistant,
        }
    }

    // -- tasks --------------------------------------------------------------

    pub async fn add_task(
        &self,
        actor: &User,
        title: &str,
        date: NaiveDate,
        priority: TaskPriority,
    ) -> EngiflowResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WorkflowError::MissingField("task title").into());
        }
        self.tasks
            .create(CreateTask {
                user_email: actor.email.clone(),
                date,
                title: title.to_string(),
                priority,
                organization_id: actor.organization_id.clone(),
            })
            .await
    }

    async fn own_task(&self, actor: &User, id: &str) -> EngiflowResult<()> {
        let owned = self
            .tasks
            .list_for_user(&actor.organization_id, &actor.email)
            .await?
            .iter()
            .any(|t| t.id == id);
        if owned {
            Ok(())
        } else {
            Err(EngiflowError::not_found("task", id))
        }
    }

    pub async fn toggle_task(&self, actor: &User, id: &str) -> EngiflowResult<Task> {
        self.own_task(actor, id).await?;
        self.tasks.toggle(&actor.organization_id, id).await
    }

    pub async fn delete_task(&self, actor: &User, id: &str) -> EngiflowResult<()> {
        self.own_task(actor, id).await?;
        self.tasks.delete(&actor.organization_id, id).await
    }

    pub async fn tasks(&self, actor: &User) -> EngiflowResult<Vec<Task>> {
        self.tasks
            .list_for_user(&actor.organization_id, &actor.email)
            .await
    }

    // -- notes --------------------------------------------------------------

    pub async fn new_note(&self, actor: &User) -> EngiflowResult<Note> {
        self.notes
            .create(&actor.organization_id, &actor.email)
            .await
    }

    async fn own_note(&self, actor: &User, id: &str) -> EngiflowResult<Note> {
        let note = self.notes.get_by_id(&actor.organization_id, id).await?;
        if !actor.has_email(&note.user_email) {
            return Err(EngiflowError::not_found("note", id));
        }
        Ok(note)
    }

    pub async fn save_note(
        &self,
        actor: &User,
        id: &str,
        title: String,
        content: String,
    ) -> EngiflowResult<Note> {
        self.own_note(actor, id).await?;
        self.notes
            .update(&actor.organization_id, id, title, content)
            .await
    }

    pub async fn delete_note(&self, actor: &User, id: &str) -> EngiflowResult<()> {
        self.own_note(actor, id).await?;
        self.notes.delete(&actor.organization_id, id).await
    }

    /// Most recently edited first.
    pub async fn notes(&self, actor: &User) -> EngiflowResult<Vec<Note>> {
        self.notes
            .list_for_user(&actor.organization_id, &actor.email)
            .await
    }

    /// Export a note's HTML body as Markdown or plain text.
    pub async fn convert_note(
        &self,
        actor: &User,
        id: &str,
        format: NoteFormat,
    ) -> EngiflowResult<String> {
        let note = self.own_note(actor, id).await?;
        debug!(note_id = id, format = format.as_str(), "Converting note");
        let converted = self
            .assistant
            .convert_note(&note.title, &note.content, format)
            .await?;
        Ok(converted)
    }

    // -- chat ---------------------------------------------------------------

    pub async fn send_message(
        &self,
        actor: &User,
        receiver_email: &str,
        text: &str,
    ) -> EngiflowResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WorkflowError::MissingField("message text").into());
        }
        self.messages
            .create(
                &actor.organization_id,
                &actor.email,
                receiver_email,
                text.to_string(),
            )
            .await
    }

    /// Oldest first.
    pub async fn conversation(&self, actor: &User, other: &str) -> EngiflowResult<Vec<ChatMessage>> {
        self.messages
            .conversation(&actor.organization_id, &actor.email, other)
            .await
    }

    // -- notifications ------------------------------------------------------

    pub async fn notifications(&self, actor: &User) -> EngiflowResult<Vec<Notification>> {
        self.notifications
            .list_for_user(&actor.organization_id, &actor.email)
            .await
    }

    pub async fn mark_notification_read(&self, actor: &User, id: &str) -> EngiflowResult<()> {
        self.notifications
            .mark_read(&actor.organization_id, id)
            .await
    }

    pub async fn mark_all_notifications_read(&self, actor: &User) -> EngiflowResult<usize> {
        self.notifications
            .mark_all_read(&actor.organization_id, &actor.email)
            .await
    }
}
