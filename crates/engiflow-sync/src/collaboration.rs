//! Collaboration Event Bus: presence, comment-typing indicators and live
//! scratchpad text for documents open in several sessions.
//!
//! Events travel over the shared medium under the collaboration key. The
//! bus is only active for organizations on the Pro plan: on any other plan
//! it neither emits nor consumes events. Envelopes carry a credential-free
//! [`UserSnapshot`], and events from another organization are dropped.
//! Presence has no heartbeat, so a session that disappears without leaving
//! stays listed.

use std::collections::HashMap;
use std::sync::Arc;

use engiflow_core::keys::COLLABORATION_EVENT_KEY;
use engiflow_core::models::collaboration::{CollaborationEvent, TypingState};
use engiflow_core::models::user::{UserSnapshot, same_email};
use engiflow_core::{EngiflowError, EngiflowResult};
use engiflow_store::repository::StoreDocumentRepository;
use engiflow_store::{StorageBackend, TabSession};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::debounce::Debouncer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborator {
    pub user: UserSnapshot,
    pub is_typing_comment: bool,
}

type PresenceMap = Arc<Mutex<HashMap<String, Vec<Collaborator>>>>;

pub struct CollaborationBus<B: StorageBackend> {
    session: Arc<TabSession<B>>,
    documents: StoreDocumentRepository<B>,
    presence: PresenceMap,
    /// Expiry timers for typing flags received from other sessions,
    /// keyed by `(doc_id, lower-cased email)`.
    remote_typing: Mutex<HashMap<(String, String), JoinHandle<()>>>,
    /// Pending "stopped typing" broadcasts for this session, per document.
    local_typing: Mutex<HashMap<String, JoinHandle<()>>>,
    scratchpad_saves: Mutex<HashMap<String, Arc<Debouncer>>>,
    config: SyncConfig,
}

impl<B: StorageBackend> CollaborationBus<B> {
    pub fn new(session: Arc<TabSession<B>>, config: SyncConfig) -> Arc<Self> {
        let documents = StoreDocumentRepository::new(session.collections().documents.clone());
        Arc::new(Self {
            session,
            documents,
            presence: Arc::new(Mutex::new(HashMap::new())),
            remote_typing: Mutex::new(HashMap::new()),
            local_typing: Mutex::new(HashMap::new()),
            scratchpad_saves: Mutex::new(HashMap::new()),
            config,
        })
    }

    /// Whether the signed-in user's organization has live collaboration.
    pub fn is_enabled(&self) -> bool {
        self.session
            .current_organization()
            .is_some_and(|org| org.is_pro())
    }

    /// Other sessions currently viewing `doc_id`.
    pub fn collaborators(&self, doc_id: &str) -> Vec<Collaborator> {
        self.presence.lock().get(doc_id).cloned().unwrap_or_default()
    }

    pub fn typing_collaborators(&self, doc_id: &str) -> Vec<Collaborator> {
        let mut collaborators = self.collaborators(doc_id);
        collaborators.retain(|c| c.is_typing_comment);
        collaborators
    }

    // -----------------------------------------------------------------------
    // Outgoing
    // -----------------------------------------------------------------------

    pub async fn join(&self, doc_id: &str) -> EngiflowResult<()> {
        let Some(user) = self.active_user() else {
            return Ok(());
        };
        self.emit(&CollaborationEvent::DocJoin {
            doc_id: doc_id.to_string(),
            user,
        })
        .await
    }

    pub async fn leave(&self, doc_id: &str) -> EngiflowResult<()> {
        if let Some(handle) = self.local_typing.lock().remove(doc_id) {
            handle.abort();
        }
        let Some(user) = self.active_user() else {
            return Ok(());
        };
        self.emit(&CollaborationEvent::DocLeave {
            doc_id: doc_id.to_string(),
            user,
        })
        .await
    }

    /// Announce a keystroke in the comment box.
    ///
    /// Broadcasts `isTyping=true` now and `false` once no further keystroke
    /// arrives within the typing timeout.
    pub async fn typing(&self, doc_id: &str) -> EngiflowResult<()> {
        let Some(user) = self.active_user() else {
            return Ok(());
        };
        if let Some(previous) = self.local_typing.lock().remove(doc_id) {
            previous.abort();
        }

        self.emit(&typing_event(doc_id, user.clone(), true)).await?;

        let store = self.session.store().clone();
        let stop = typing_event(doc_id, user, false);
        let timeout = self.config.typing_timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(err) = store.save(COLLABORATION_EVENT_KEY, &stop).await {
                warn!(error = %err, "Failed to broadcast typing stop");
            }
        });
        if let Some(stale) = self.local_typing.lock().insert(doc_id.to_string(), handle) {
            stale.abort();
        }
        Ok(())
    }

    pub async fn stop_typing(&self, doc_id: &str) -> EngiflowResult<()> {
        if let Some(handle) = self.local_typing.lock().remove(doc_id) {
            handle.abort();
        }
        let Some(user) = self.active_user() else {
            return Ok(());
        };
        self.emit(&typing_event(doc_id, user, false)).await
    }

    /// Persist new scratchpad text for `doc_id` and push it to other
    /// sessions.
    pub async fn update_scratchpad(&self, doc_id: &str, content: String) -> EngiflowResult<()> {
        let user = self.session.require_user()?;
        if !self.is_enabled() {
            return Err(EngiflowError::AuthorizationDenied {
                reason: "the collaborative scratchpad requires the Pro plan".into(),
            });
        }

        let org_id = user.organization_id.clone();
        self.session
            .collections()
            .documents
            .mutate(|docs| {
                let doc = docs
                    .iter_mut()
                    .find(|d| d.id == doc_id && d.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("document", doc_id))?;
                doc.scratchpad_content = content.clone();
                Ok(())
            })
            .await?;

        self.emit(&CollaborationEvent::DocScratchpadUpdate {
            doc_id: doc_id.to_string(),
            user: user.snapshot(),
            content,
        })
        .await
    }

    /// Record a scratchpad edit.
    ///
    /// The local cache reflects the text at once; persisting and
    /// broadcasting wait until the editor has been idle for the
    /// scratchpad auto-save delay.
    pub fn edit_scratchpad(self: &Arc<Self>, doc_id: &str, content: String) -> EngiflowResult<()> {
        let user = self.session.require_user()?;
        let shown = content.clone();
        self.documents
            .update_cached(&user.organization_id, doc_id, |doc| doc.scratchpad_content = shown);

        let debouncer = self
            .scratchpad_saves
            .lock()
            .entry(doc_id.to_string())
            .or_insert_with(|| Arc::new(Debouncer::new(self.config.scratchpad_autosave)))
            .clone();
        let bus = Arc::clone(self);
        let doc_id = doc_id.to_string();
        debouncer.schedule(async move {
            if let Err(err) = bus.update_scratchpad(&doc_id, content).await {
                warn!(doc_id, error = %err, "Scratchpad auto-save failed");
            }
        });
        Ok(())
    }

    async fn emit(&self, event: &CollaborationEvent) -> EngiflowResult<()> {
        debug!(kind = event.kind(), doc_id = event.doc_id(), "Emitting collaboration event");
        self.session
            .store()
            .save(COLLABORATION_EVENT_KEY, event)
            .await?;
        Ok(())
    }

    fn active_user(&self) -> Option<UserSnapshot> {
        if !self.is_enabled() {
            return None;
        }
        self.session.current_user().map(|user| user.snapshot())
    }

    // -----------------------------------------------------------------------
    // Incoming
    // -----------------------------------------------------------------------

    /// Apply an event received from another session. Returns whether
    /// anything was applied.
    pub fn apply_remote(&self, event: CollaborationEvent) -> bool {
        let Some(me) = self.session.current_user() else {
            return false;
        };
        let sender = event.user();
        if sender.organization_id != me.organization_id {
            debug!(doc_id = event.doc_id(), "Ignoring collaboration event from another tenant");
            return false;
        }
        if me.has_email(&sender.email) || !self.is_enabled() {
            return false;
        }

        match event {
            CollaborationEvent::DocJoin { doc_id, user } => {
                let mut presence = self.presence.lock();
                let list = presence.entry(doc_id).or_default();
                if !list.iter().any(|c| c.user.has_email(&user.email)) {
                    list.push(Collaborator {
                        user,
                        is_typing_comment: false,
                    });
                }
            }
            CollaborationEvent::DocLeave { doc_id, user } => {
                self.cancel_remote_typing(&doc_id, &user.email);
                if let Some(list) = self.presence.lock().get_mut(&doc_id) {
                    list.retain(|c| !c.user.has_email(&user.email));
                }
            }
            CollaborationEvent::DocCommentTyping {
                doc_id,
                user,
                content: TypingState { is_typing },
            } => {
                let email = user.email.clone();
                set_typing(&self.presence, &doc_id, user, is_typing);
                self.cancel_remote_typing(&doc_id, &email);
                if is_typing {
                    self.expire_remote_typing(doc_id, email);
                }
            }
            CollaborationEvent::DocScratchpadUpdate {
                doc_id, content, ..
            } => {
                let applied = self
                    .documents
                    .update_cached(&me.organization_id, &doc_id, |doc| {
                        doc.scratchpad_content = content
                    });
                if !applied {
                    debug!(doc_id, "Scratchpad update for unknown document");
                }
                return applied;
            }
        }
        true
    }

    fn cancel_remote_typing(&self, doc_id: &str, email: &str) {
        let key = (doc_id.to_string(), email.to_ascii_lowercase());
        if let Some(handle) = self.remote_typing.lock().remove(&key) {
            handle.abort();
        }
    }

    fn expire_remote_typing(&self, doc_id: String, email: String) {
        let presence = Arc::clone(&self.presence);
        let timeout = self.config.typing_timeout;
        let (task_doc, task_email) = (doc_id.clone(), email.clone());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(list) = presence.lock().get_mut(&task_doc) {
                for c in list.iter_mut().filter(|c| c.user.has_email(&task_email)) {
                    c.is_typing_comment = false;
                }
            }
        });
        self.remote_typing
            .lock()
            .insert((doc_id, email.to_ascii_lowercase()), handle);
    }
}

impl<B: StorageBackend> Drop for CollaborationBus<B> {
    fn drop(&mut self) {
        for (_, handle) in self.remote_typing.get_mut().drain() {
            handle.abort();
        }
        for (_, handle) in self.local_typing.get_mut().drain() {
            handle.abort();
        }
    }
}

fn typing_event(doc_id: &str, user: UserSnapshot, is_typing: bool) -> CollaborationEvent {
    CollaborationEvent::DocCommentTyping {
        doc_id: doc_id.to_string(),
        user,
        content: TypingState { is_typing },
    }
}

/// Upsert a collaborator's typing flag.
fn set_typing(presence: &PresenceMap, doc_id: &str, user: UserSnapshot, is_typing: bool) {
    let mut presence = presence.lock();
    let list = presence.entry(doc_id.to_string()).or_default();
    match list.iter_mut().find(|c| same_email(&c.user.email, &user.email)) {
        Some(existing) => existing.is_typing_comment = is_typing,
        None => list.push(Collaborator {
            user,
            is_typing_comment: is_typing,
        }),
    }
}
