use std::sync::Arc;

use chrono::Utc;
use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::note::Note;
use engiflow_core::models::user::same_email;
use engiflow_core::repository::NoteRepository;

use super::new_id;
use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreNoteRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Note>>,
}

impl<B: StorageBackend> StoreNoteRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Note>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> NoteRepository for StoreNoteRepository<B> {
    async fn create(&self, org_id: &str, email: &str) -> EngiflowResult<Note> {
        self.collection
            .mutate(|notes| {
                let now = Utc::now();
                let note = Note {
                    id: new_id("note"),
                    user_email: email.to_string(),
                    title: "Untitled Note".to_string(),
                    content: String::new(),
                    created_at: now,
                    updated_at: now,
                    organization_id: org_id.to_string(),
                };
                notes.insert(0, note.clone());
                Ok(note)
            })
            .await
    }

    async fn get_by_id(&self, org_id: &str, id: &str) -> EngiflowResult<Note> {
        self.collection
            .read(|notes| {
                notes
                    .iter()
                    .find(|n| n.id == id && n.organization_id == org_id)
                    .cloned()
            })
            .ok_or_else(|| EngiflowError::not_found("note", id))
    }

    async fn update(
        &self,
        org_id: &str,
        id: &str,
        title: String,
        content: String,
    ) -> EngiflowResult<Note> {
        self.collection
            .mutate(move |notes| {
                let note = notes
                    .iter_mut()
                    .find(|n| n.id == id && n.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("note", id))?;
                note.title = title;
                note.content = content;
                note.updated_at = Utc::now();
                Ok(note.clone())
            })
            .await
    }

    async fn delete(&self, org_id: &str, id: &str) -> EngiflowResult<()> {
        self.collection
            .mutate(|notes| {
                let before = notes.len();
                notes.retain(|n| !(n.id == id && n.organization_id == org_id));
                if notes.len() == before {
                    return Err(EngiflowError::not_found("note", id));
                }
                Ok(())
            })
            .await
    }

    /// Most recently edited first.
    async fn list_for_user(&self, org_id: &str, email: &str) -> EngiflowResult<Vec<Note>> {
        let mut notes: Vec<Note> = self.collection.read(|notes| {
            notes
                .iter()
                .filter(|n| n.organization_id == org_id && same_email(&n.user_email, email))
                .cloned()
                .collect()
        });
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }
}
