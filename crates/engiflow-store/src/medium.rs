//! The storage medium shared by every open session ("tab").
//!
//! Every write through a [`TabStorage`] overwrites the key in the backend
//! and then broadcasts a [`StorageEvent`] to all other tabs. Delivery is
//! at-most-once: a subscriber that falls behind the channel capacity loses
//! the oldest events. Events carry the full new value, so the next
//! delivered event for the same key repairs a gap.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::StoreError;

/// Default number of undelivered events a slow tab may buffer.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mutation observed on the medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    pub origin: TabId,
}

pub struct SharedMedium<B: StorageBackend> {
    backend: B,
    events: broadcast::Sender<StorageEvent>,
}

impl<B: StorageBackend> SharedMedium<B> {
    pub fn new(backend: B) -> Arc<Self> {
        Self::with_capacity(backend, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(backend: B, capacity: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(capacity);
        Arc::new(Self { backend, events })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open a new tab on this medium.
    pub fn open_tab(self: &Arc<Self>) -> TabStorage<B> {
        let id = TabId::new();
        debug!(tab = %id, "Opened tab");
        TabStorage {
            id,
            medium: Arc::clone(self),
        }
    }
}

/// One tab's handle on the shared medium.
pub struct TabStorage<B: StorageBackend> {
    id: TabId,
    medium: Arc<SharedMedium<B>>,
}

impl<B: StorageBackend> Clone for TabStorage<B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            medium: Arc::clone(&self.medium),
        }
    }
}

impl<B: StorageBackend> TabStorage<B> {
    pub fn id(&self) -> TabId {
        self.id
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.medium.backend.get(key).await
    }

    pub async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.medium.backend.set(key, value.clone()).await?;
        self.publish(key, Some(value));
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.medium.backend.remove(key).await?;
        self.publish(key, None);
        Ok(())
    }

    /// Subscribe to writes made by *other* tabs from now on.
    pub fn subscribe(&self) -> ExternalEvents {
        ExternalEvents {
            tab: self.id,
            receiver: self.medium.events.subscribe(),
        }
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        let event = StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.id,
        };
        // No receivers is not an error: a lone tab has nobody to notify.
        let _ = self.medium.events.send(event);
    }
}

/// Stream of storage events originating in other tabs.
pub struct ExternalEvents {
    tab: TabId,
    receiver: broadcast::Receiver<StorageEvent>,
}

impl ExternalEvents {
    /// Next foreign event, or `None` once the medium is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.tab => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(tab = %self.tab, skipped, "Dropped storage events, subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.origin == self.tab => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(tab = %self.tab, skipped, "Dropped storage events, subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
