//! The Persisted Store: typed whole-value `load` / `save` over a tab's
//! storage handle.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::medium::TabStorage;

pub struct PersistedStore<B: StorageBackend> {
    storage: TabStorage<B>,
}

impl<B: StorageBackend> Clone for PersistedStore<B> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<B: StorageBackend> PersistedStore<B> {
    pub fn new(storage: TabStorage<B>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &TabStorage<B> {
        &self.storage
    }

    /// Parse the JSON stored under `key`.
    ///
    /// Absence, a backend failure, or unparsable content all yield
    /// `fallback`; the latter two are logged and never propagated.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.storage.get(key).await {
            Ok(Some(raw)) => parse(key, &raw, fallback),
            Ok(None) => fallback,
            Err(err) => {
                warn!(key, error = %err, "Failed to read storage key, using fallback");
                fallback
            }
        }
    }

    /// Like [`load`](Self::load), but an absent key is first written with
    /// `seed`, so later tabs read the same data instead of their own seed.
    /// A failed seed write is logged and the seed is still returned.
    pub async fn load_or_seed<T>(&self, key: &str, seed: T) -> T
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        match self.storage.get(key).await {
            Ok(Some(raw)) => parse(key, &raw, seed),
            Ok(None) => {
                match self.save(key, &seed).await {
                    Ok(()) => debug!(key, "Seed data written"),
                    Err(err) => warn!(key, error = %err, "Failed to write seed data"),
                }
                seed
            }
            Err(err) => {
                warn!(key, error = %err, "Failed to read storage key, using fallback");
                seed
            }
        }
    }

    /// Serialize `value` and overwrite `key` with it.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.storage.set(key, raw).await
    }

    pub async fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove(key).await
    }
}

fn parse<T: DeserializeOwned>(key: &str, raw: &str, fallback: T) -> T {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "Error parsing stored JSON, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::medium::SharedMedium;

    #[tokio::test]
    async fn missing_key_returns_fallback() {
        let medium = SharedMedium::new(MemoryBackend::new());
        let store = PersistedStore::new(medium.open_tab());
        let loaded: Vec<u32> = store.load("absent", vec![7]).await;
        assert_eq!(loaded, vec![7]);
    }

    #[tokio::test]
    async fn corrupted_json_returns_fallback() {
        let medium = SharedMedium::new(MemoryBackend::new());
        medium.backend().insert_raw("broken", "{not json");
        let store = PersistedStore::new(medium.open_tab());
        let loaded: Vec<u32> = store.load("broken", Vec::new()).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn absent_key_is_written_with_the_seed() {
        let medium = SharedMedium::new(MemoryBackend::new());
        let store = PersistedStore::new(medium.open_tab());

        let seeded: Vec<u32> = store.load_or_seed("fresh", vec![1, 2]).await;
        assert_eq!(seeded, vec![1, 2]);
        let stored = medium.backend().get("fresh").await.unwrap();
        assert_eq!(stored.as_deref(), Some("[1,2]"));

        // A stored value always wins over a different seed.
        let again: Vec<u32> = store.load_or_seed("fresh", vec![9]).await;
        assert_eq!(again, vec![1, 2]);
    }

    #[tokio::test]
    async fn save_then_load_is_identical() {
        let medium = SharedMedium::new(MemoryBackend::new());
        let store = PersistedStore::new(medium.open_tab());
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), vec![1, 2, 3]);
        value.insert("b".to_string(), vec![]);

        store.save("map", &value).await.unwrap();
        let loaded: BTreeMap<String, Vec<i32>> = store.load("map", BTreeMap::new()).await;
        assert_eq!(loaded, value);
    }
}
