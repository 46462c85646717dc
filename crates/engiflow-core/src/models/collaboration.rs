//! Ephemeral collaboration envelopes exchanged between sessions.
//!
//! Wire shape: `{"type": "...", "docId": "...", "user": {...}, "content": ...}`.

use serde::{Deserialize, Serialize};

use super::user::UserSnapshot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingState {
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CollaborationEvent {
    #[serde(rename_all = "camelCase")]
    DocJoin { doc_id: String, user: UserSnapshot },
    #[serde(rename_all = "camelCase")]
    DocLeave { doc_id: String, user: UserSnapshot },
    #[serde(rename_all = "camelCase")]
    DocCommentTyping {
        doc_id: String,
        user: UserSnapshot,
        content: TypingState,
    },
    /// The one event that also changes a durable field
    /// (`Document::scratchpad_content`).
    #[serde(rename_all = "camelCase")]
    DocScratchpadUpdate {
        doc_id: String,
        user: UserSnapshot,
        content: String,
    },
}

impl CollaborationEvent {
    pub fn doc_id(&self) -> &str {
        match self {
            CollaborationEvent::DocJoin { doc_id, .. }
            | CollaborationEvent::DocLeave { doc_id, .. }
            | CollaborationEvent::DocCommentTyping { doc_id, .. }
            | CollaborationEvent::DocScratchpadUpdate { doc_id, .. } => doc_id,
        }
    }

    pub fn user(&self) -> &UserSnapshot {
        match self {
            CollaborationEvent::DocJoin { user, .. }
            | CollaborationEvent::DocLeave { user, .. }
            | CollaborationEvent::DocCommentTyping { user, .. }
            | CollaborationEvent::DocScratchpadUpdate { user, .. } => user,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CollaborationEvent::DocJoin { .. } => "doc-join",
            CollaborationEvent::DocLeave { .. } => "doc-leave",
            CollaborationEvent::DocCommentTyping { .. } => "doc-comment-typing",
            CollaborationEvent::DocScratchpadUpdate { .. } => "doc-scratchpad-update",
        }
    }
}
