//! Raw key/value storage backends.
//!
//! A backend stores opaque strings under string keys and knows nothing
//! about collections, sessions or change signals.

mod memory;
mod surreal;

pub use memory::MemoryBackend;
pub use surreal::SurrealBackend;

use crate::error::StoreError;

pub trait StorageBackend: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;
    /// Overwrite the whole value stored under `key`.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
