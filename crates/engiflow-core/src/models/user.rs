//! User domain model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    /// Invited but has not chosen a password yet.
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    /// Natural key within the organization.
    pub email: String,
    /// Argon2id PHC string. `None` until the account is activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: UserRole,
    pub organization_id: String,
    pub status: UserStatus,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Case-insensitive email comparison, the way logins and invitations
    /// match users.
    pub fn has_email(&self, email: &str) -> bool {
        same_email(&self.email, email)
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot::from(self)
    }
}

/// Email identity used everywhere a user is matched: trimmed and
/// ASCII case-insensitive.
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Public profile of a user, without credentials. This is what documents
/// and collaboration envelopes embed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role: UserRole,
    pub organization_id: String,
    pub status: UserStatus,
}

impl UserSnapshot {
    pub fn has_email(&self, email: &str) -> bool {
        same_email(&self.email, email)
    }
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
            role: user.role,
            organization_id: user.organization_id.clone(),
            status: user.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Already-hashed password, if the account starts active.
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub organization_id: String,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}
