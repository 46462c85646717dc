//! Synchronization Listener: reconciles a tab's caches with writes made by
//! other tabs.
//!
//! Every signal for a durable collection carries the collection's full new
//! value and replaces this tab's copy outright. There is no merging and no
//! dedup: the last signal received wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use engiflow_core::keys::{COLLABORATION_EVENT_KEY, CollectionKey};
use engiflow_core::models::collaboration::CollaborationEvent;
use engiflow_store::{ExternalEvents, StorageBackend, StorageEvent, TabSession};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::collaboration::CollaborationBus;

/// What handling one signal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A cached collection was replaced; holds the new item count.
    Replaced { key: CollectionKey, count: usize },
    /// A collaboration event was applied.
    Collaboration { kind: &'static str },
    /// Removed key, unknown key, own echo, or inactive collaboration.
    Ignored,
    /// The value could not be parsed; nothing changed.
    Malformed,
}

pub struct SyncListener<B: StorageBackend> {
    session: Arc<TabSession<B>>,
    bus: Arc<CollaborationBus<B>>,
    last_sync: watch::Sender<Option<DateTime<Utc>>>,
}

impl<B: StorageBackend> SyncListener<B> {
    pub fn new(session: Arc<TabSession<B>>, bus: Arc<CollaborationBus<B>>) -> Arc<Self> {
        let (last_sync, _) = watch::channel(None);
        Arc::new(Self {
            session,
            bus,
            last_sync,
        })
    }

    /// Time of the most recent successful sync.
    pub fn last_sync(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_sync.subscribe()
    }

    /// Subscribe to the medium now and process signals on a background
    /// task until the medium closes or the handle is aborted.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let events = self.session.store().storage().subscribe();
        let listener = Arc::clone(self);
        tokio::spawn(async move { listener.run(events).await })
    }

    pub async fn run(&self, mut events: ExternalEvents) {
        info!(tab = %self.session.tab_id(), "Sync listener started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!(tab = %self.session.tab_id(), "Sync listener stopped");
    }

    pub fn handle(&self, event: StorageEvent) -> SyncOutcome {
        let Some(raw) = event.new_value else {
            return SyncOutcome::Ignored;
        };

        let outcome = if event.key == COLLABORATION_EVENT_KEY {
            self.handle_collaboration(&raw)
        } else if let Some(key) = CollectionKey::parse(&event.key) {
            self.handle_collection(key, &raw)
        } else {
            SyncOutcome::Ignored
        };

        if matches!(
            outcome,
            SyncOutcome::Replaced { .. } | SyncOutcome::Collaboration { .. }
        ) {
            self.touch();
        }
        outcome
    }

    /// Reload every collection from the store, regardless of signals.
    pub async fn refresh(&self) {
        self.session.collections().reload_all().await;
        self.session.refresh_current_user();
        self.touch();
        info!(tab = %self.session.tab_id(), "Collections refreshed from storage");
    }

    fn handle_collection(&self, key: CollectionKey, raw: &str) -> SyncOutcome {
        match self.session.collections().replace_from_json(key, raw) {
            Ok(count) => {
                if key == CollectionKey::Users {
                    self.session.refresh_current_user();
                }
                debug!(key = %key, count, "Collection replaced from signal");
                SyncOutcome::Replaced { key, count }
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Error processing storage event");
                SyncOutcome::Malformed
            }
        }
    }

    fn handle_collaboration(&self, raw: &str) -> SyncOutcome {
        let event: CollaborationEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "Error processing collaboration event");
                return SyncOutcome::Malformed;
            }
        };

        let Some(me) = self.session.current_user() else {
            return SyncOutcome::Ignored;
        };
        if me.has_email(&event.user().email) {
            return SyncOutcome::Ignored;
        }

        let kind = event.kind();
        if self.bus.apply_remote(event) {
            SyncOutcome::Collaboration { kind }
        } else {
            SyncOutcome::Ignored
        }
    }

    fn touch(&self) {
        self.last_sync.send_replace(Some(Utc::now()));
    }
}
