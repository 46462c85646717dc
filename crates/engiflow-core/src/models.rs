//! Domain models for EngiFlow.
//!
//! Every entity serializes with camelCase field names; that JSON is the
//! persisted representation of each collection.

pub mod collaboration;
pub mod document;
pub mod message;
pub mod note;
pub mod notification;
pub mod organization;
pub mod project;
pub mod task;
pub mod user;
