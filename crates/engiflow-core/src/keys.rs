//! Storage keys shared by every session.
//!
//! One key per durable collection, two scalar keys, and the collaboration
//! channel.

use std::fmt;

/// Scalar key holding the signed-in user's email (JSON string).
pub const LOGGED_IN_USER_KEY: &str = "loggedInUserEmail";

/// Scalar key holding the UI theme (`light` / `dark`, stored raw).
pub const THEME_KEY: &str = "theme";

/// Ephemeral channel for presence, typing and scratchpad pushes.
pub const COLLABORATION_EVENT_KEY: &str = "engiFlowCollaborationEvent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Organizations,
    Users,
    Documents,
    Projects,
    Tasks,
    Notes,
    Messages,
    Notifications,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 8] = [
        CollectionKey::Organizations,
        CollectionKey::Users,
        CollectionKey::Documents,
        CollectionKey::Projects,
        CollectionKey::Tasks,
        CollectionKey::Notes,
        CollectionKey::Messages,
        CollectionKey::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Organizations => "engiFlowOrganizations",
            CollectionKey::Users => "engiFlowUsers",
            CollectionKey::Documents => "engiFlowDocuments",
            CollectionKey::Projects => "engiFlowProjects",
            CollectionKey::Tasks => "engiFlowTasks",
            CollectionKey::Notes => "engiFlowNotes",
            CollectionKey::Messages => "engiFlowMessages",
            CollectionKey::Notifications => "engiFlowNotifications",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_parses_back() {
        for key in CollectionKey::ALL {
            assert_eq!(CollectionKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn scalar_and_channel_keys_are_not_collections() {
        assert_eq!(CollectionKey::parse(LOGGED_IN_USER_KEY), None);
        assert_eq!(CollectionKey::parse(THEME_KEY), None);
        assert_eq!(CollectionKey::parse(COLLABORATION_EVENT_KEY), None);
    }
}
