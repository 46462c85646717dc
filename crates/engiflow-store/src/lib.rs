//! EngiFlow storage: key/value backends, the shared medium that signals
//! writes to other sessions, the Persisted Store, per-tab cached
//! collections and the repository implementations built on them.
//!
//! This crate provides:
//! - Backends ([`MemoryBackend`], [`SurrealBackend`] via [`connect`])
//! - The shared medium ([`SharedMedium`], [`TabStorage`], [`StorageEvent`])
//! - Typed whole-value persistence ([`PersistedStore`])
//! - Cached collections and repositories ([`Collections`], [`Repositories`])
//! - The per-tab session ([`TabSession`])

pub mod backend;
pub mod collection;
pub mod collections;
mod connection;
mod error;
pub mod medium;
pub mod persisted;
pub mod repository;
mod schema;
pub mod session;

pub use backend::{MemoryBackend, StorageBackend, SurrealBackend};
pub use collection::CachedCollection;
pub use collections::{Collections, SeedData};
pub use connection::{DbConfig, connect};
pub use error::StoreError;
pub use medium::{ExternalEvents, SharedMedium, StorageEvent, TabId, TabStorage};
pub use persisted::PersistedStore;
pub use repository::Repositories;
pub use schema::run_migrations;
pub use session::{TabSession, Theme};
