//! Debounced note auto-save.

use std::collections::HashMap;
use std::sync::Arc;

use engiflow_core::EngiflowResult;
use engiflow_core::repository::NoteRepository;
use engiflow_store::repository::StoreNoteRepository;
use engiflow_store::{StorageBackend, TabSession};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::debounce::Debouncer;

pub struct NoteAutosave<B: StorageBackend> {
    session: Arc<TabSession<B>>,
    notes: Arc<StoreNoteRepository<B>>,
    pending: Mutex<HashMap<String, Debouncer>>,
    config: SyncConfig,
}

impl<B: StorageBackend> NoteAutosave<B> {
    pub fn new(session: Arc<TabSession<B>>, config: SyncConfig) -> Self {
        let notes = Arc::new(StoreNoteRepository::new(session.collections().notes.clone()));
        Self {
            session,
            notes,
            pending: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Show an edit immediately and persist it once the note has been idle
    /// for the auto-save delay. Only the last edit in a burst is written.
    pub fn edit(&self, note_id: &str, title: String, content: String) -> EngiflowResult<()> {
        let user = self.session.require_user()?;
        let org_id = user.organization_id;

        let (shown_title, shown_content) = (title.clone(), content.clone());
        self.session.collections().notes.update_cached(|notes| {
            if let Some(note) = notes
                .iter_mut()
                .find(|n| n.id == note_id && n.organization_id == org_id)
            {
                note.title = shown_title;
                note.content = shown_content;
            }
        });

        let notes = Arc::clone(&self.notes);
        let id = note_id.to_string();
        self.pending
            .lock()
            .entry(note_id.to_string())
            .or_insert_with(|| Debouncer::new(self.config.note_autosave))
            .schedule(async move {
                match notes.update(&org_id, &id, title, content).await {
                    Ok(_) => debug!(note_id = %id, "Note auto-saved"),
                    Err(err) => warn!(note_id = %id, error = %err, "Note auto-save failed"),
                }
            });
        Ok(())
    }

    pub fn has_pending(&self, note_id: &str) -> bool {
        self.pending
            .lock()
            .get(note_id)
            .is_some_and(Debouncer::is_pending)
    }

    /// Drop a pending save, e.g. when the note is deleted.
    pub fn discard(&self, note_id: &str) {
        if let Some(debouncer) = self.pending.lock().remove(note_id) {
            debouncer.cancel();
        }
    }
}
