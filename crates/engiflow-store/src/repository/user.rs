//! Cached-collection implementation of [`UserRepository`].
//!
//! Emails are matched case-insensitively. Password hashing happens in the
//! workflow layer; this repository only stores the resulting hash.

use std::sync::Arc;

use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::user::{CreateUser, UpdateUser, User};
use engiflow_core::repository::UserRepository;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreUserRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, User>>,
}

impl<B: StorageBackend> StoreUserRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, User>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> UserRepository for StoreUserRepository<B> {
    async fn create(&self, input: CreateUser) -> EngiflowResult<User> {
        let user = self
            .collection
            .mutate(move |users| {
                let taken = users
                    .iter()
                    .any(|u| u.organization_id == input.organization_id && u.has_email(&input.email));
                if taken {
                    return Err(EngiflowError::AlreadyExists {
                        entity: "user".into(),
                    });
                }
                let user = User {
                    name: input.name,
                    email: input.email.trim().to_string(),
                    password_hash: input.password_hash,
                    photo_url: None,
                    role: input.role,
                    organization_id: input.organization_id,
                    status: input.status,
                };
                users.push(user.clone());
                Ok(user)
            })
            .await?;

        debug!(email = %user.email, org_id = %user.organization_id, "User created");
        Ok(user)
    }

    async fn get_by_email(&self, org_id: &str, email: &str) -> EngiflowResult<User> {
        self.collection
            .read(|users| {
                users
                    .iter()
                    .find(|u| u.organization_id == org_id && u.has_email(email))
                    .cloned()
            })
            .ok_or_else(|| EngiflowError::not_found("user", email))
    }

    async fn email_registered(&self, email: &str) -> EngiflowResult<bool> {
        Ok(self.collection.read(|users| users.iter().any(|u| u.has_email(email))))
    }

    async fn update(&self, org_id: &str, email: &str, input: UpdateUser) -> EngiflowResult<User> {
        self.collection
            .mutate(|users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.organization_id == org_id && u.has_email(email))
                    .ok_or_else(|| EngiflowError::not_found("user", email))?;

                if let Some(name) = input.name {
                    user.name = name;
                }
                if let Some(photo_url) = input.photo_url {
                    user.photo_url = Some(photo_url);
                }
                if let Some(hash) = input.password_hash {
                    user.password_hash = Some(hash);
                }
                if let Some(role) = input.role {
                    user.role = role;
                }
                if let Some(status) = input.status {
                    user.status = status;
                }
                Ok(user.clone())
            })
            .await
    }

    async fn list(&self, org_id: &str) -> EngiflowResult<Vec<User>> {
        Ok(self.collection.read(|users| {
            users
                .iter()
                .filter(|u| u.organization_id == org_id)
                .cloned()
                .collect()
        }))
    }
}
