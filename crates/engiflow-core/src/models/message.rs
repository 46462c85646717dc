//! Direct chat messages between two members of an organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::same_email;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_email: String,
    pub receiver_email: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub organization_id: String,
}

impl ChatMessage {
    /// Whether the message belongs to the conversation between `a` and `b`.
    pub fn between(&self, a: &str, b: &str) -> bool {
        (same_email(&self.sender_email, a) && same_email(&self.receiver_email, b))
            || (same_email(&self.sender_email, b) && same_email(&self.receiver_email, a))
    }
}
