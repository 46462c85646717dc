//! A tab's in-memory cache of one durable collection.
//!
//! Mutations follow read-modify-write over the whole collection: clone the
//! cache, apply the change, overwrite the storage key with the full result,
//! then swap the cache. Writes from the same tab are serialized. Writes from
//! different tabs are not coordinated at all: if two tabs interleave their
//! read-modify-write cycles on the same key, the later write wins and the
//! earlier tab's change is silently lost.

use engiflow_core::EngiflowResult;
use engiflow_core::keys::CollectionKey;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::persisted::PersistedStore;

pub struct CachedCollection<B: StorageBackend, T> {
    key: CollectionKey,
    store: PersistedStore<B>,
    items: RwLock<Vec<T>>,
    write_lock: Mutex<()>,
}

impl<B, T> CachedCollection<B, T>
where
    B: StorageBackend,
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Load the collection from storage, or start from `fallback`.
    ///
    /// A non-empty fallback for a key that was never written is persisted,
    /// so it becomes the shared starting point for every tab.
    pub async fn load(store: PersistedStore<B>, key: CollectionKey, fallback: Vec<T>) -> Self {
        let items = if fallback.is_empty() {
            store.load(key.as_str(), fallback).await
        } else {
            store.load_or_seed(key.as_str(), fallback).await
        };
        Self {
            key,
            store,
            items: RwLock::new(items),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> CollectionKey {
        self.key
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Run `f` against the cached items without cloning them.
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.read())
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Replace the cache wholesale without writing to storage.
    pub fn replace(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    /// Parse a serialized collection and replace the cache with it.
    pub fn replace_from_json(&self, raw: &str) -> Result<usize, serde_json::Error> {
        let items: Vec<T> = serde_json::from_str(raw)?;
        let count = items.len();
        self.replace(items);
        Ok(count)
    }

    /// Edit the cache in place without writing to storage.
    pub fn update_cached(&self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.items.write());
    }

    /// Re-read the collection from storage, keeping the cache on failure.
    pub async fn reload(&self) {
        let current = self.snapshot();
        let items = self.store.load(self.key.as_str(), current).await;
        self.replace(items);
    }

    /// Apply `f` to a copy of the collection and persist the whole result.
    ///
    /// Nothing is written if `f` fails.
    pub async fn mutate<R, F>(&self, f: F) -> EngiflowResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> EngiflowResult<R> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut working = self.snapshot();
        let result = f(&mut working)?;

        self.store.save(self.key.as_str(), &working).await?;
        debug!(key = %self.key, len = working.len(), "Collection saved");
        self.replace(working);

        Ok(result)
    }
}
