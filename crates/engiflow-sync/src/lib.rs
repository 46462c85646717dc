//! EngiFlow cross-session synchronization.
//!
//! - [`SyncListener`] applies other tabs' writes to this tab's caches
//! - [`CollaborationBus`] carries presence, typing and scratchpad events
//! - [`Debouncer`] and [`NoteAutosave`] implement idle-time auto-save

pub mod autosave;
pub mod collaboration;
mod config;
pub mod debounce;
pub mod listener;

pub use autosave::NoteAutosave;
pub use collaboration::{CollaborationBus, Collaborator};
pub use config::SyncConfig;
pub use debounce::Debouncer;
pub use listener::{SyncListener, SyncOutcome};
