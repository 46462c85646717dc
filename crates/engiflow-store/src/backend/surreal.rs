//! SurrealDB implementation of [`StorageBackend`].

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::StorageBackend;
use crate::error::StoreError;

/// DB-side row struct for a single key.
#[derive(Debug, SurrealValue)]
struct EntryRow {
    payload: String,
}

/// Durable backend: one `kv_entry` record per storage key.
///
/// Run [`crate::run_migrations`] on the handle before use.
#[derive(Clone)]
pub struct SurrealBackend<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBackend<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StorageBackend for SurrealBackend<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut result = self
            .db
            .query("SELECT payload FROM type::record('kv_entry', $key)")
            .bind(("key", key.to_string()))
            .await?;

        let rows: Vec<EntryRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|row| row.payload))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.db
            .query(
                "UPSERT type::record('kv_entry', $key) SET \
                 payload = $payload, updated_at = time::now()",
            )
            .bind(("key", key.to_string()))
            .bind(("payload", value))
            .await?
            .check()?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .query("DELETE type::record('kv_entry', $key)")
            .bind(("key", key.to_string()))
            .await?;
        Ok(())
    }
}
