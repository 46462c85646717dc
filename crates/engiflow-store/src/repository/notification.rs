use std::sync::Arc;

use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::notification::Notification;
use engiflow_core::models::user::same_email;
use engiflow_core::repository::NotificationRepository;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreNotificationRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Notification>>,
}

impl<B: StorageBackend> StoreNotificationRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Notification>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> NotificationRepository for StoreNotificationRepository<B> {
    async fn create_many(&self, notifications: Vec<Notification>) -> EngiflowResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        let count = notifications.len();
        self.collection
            .mutate(move |all| {
                all.extend(notifications);
                Ok(())
            })
            .await?;
        debug!(count, "Notifications stored");
        Ok(())
    }

    async fn mark_read(&self, org_id: &str, id: &str) -> EngiflowResult<()> {
        self.collection
            .mutate(|all| {
                let notification = all
                    .iter_mut()
                    .find(|n| n.id == id && n.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("notification", id))?;
                notification.is_read = true;
                Ok(())
            })
            .await
    }

    async fn mark_all_read(&self, org_id: &str, email: &str) -> EngiflowResult<usize> {
        let unread = self.collection.read(|all| {
            all.iter()
                .filter(|n| unread_for(n, org_id, email))
                .count()
        });
        if unread == 0 {
            return Ok(0);
        }
        self.collection
            .mutate(|all| {
                let mut changed = 0;
                for n in all.iter_mut().filter(|n| unread_for(n, org_id, email)) {
                    n.is_read = true;
                    changed += 1;
                }
                Ok(changed)
            })
            .await
    }

    async fn mark_document_read(
        &self,
        org_id: &str,
        document_id: &str,
        email: &str,
    ) -> EngiflowResult<usize> {
        let matches = |n: &Notification| n.document_id == document_id && unread_for(n, org_id, email);
        if !self.collection.read(|all| all.iter().any(matches)) {
            return Ok(0);
        }
        self.collection
            .mutate(|all| {
                let mut changed = 0;
                for n in all.iter_mut().filter(|n| matches(n)) {
                    n.is_read = true;
                    changed += 1;
                }
                Ok(changed)
            })
            .await
    }

    async fn list_for_user(&self, org_id: &str, email: &str) -> EngiflowResult<Vec<Notification>> {
        Ok(self.collection.read(|all| {
            all.iter()
                .filter(|n| n.organization_id == org_id && same_email(&n.recipient_email, email))
                .cloned()
                .collect()
        }))
    }
}

fn unread_for(n: &Notification, org_id: &str, email: &str) -> bool {
    n.organization_id == org_id && same_email(&n.recipient_email, email) && !n.is_read
}
