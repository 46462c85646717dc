use std::sync::Arc;

use chrono::Utc;
use engiflow_core::error::EngiflowResult;
use engiflow_core::models::message::ChatMessage;
use engiflow_core::repository::MessageRepository;
use tracing::debug;

use super::new_id;
use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreMessageRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, ChatMessage>>,
}

impl<B: StorageBackend> StoreMessageRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, ChatMessage>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> MessageRepository for StoreMessageRepository<B> {
    async fn create(
        &self,
        org_id: &str,
        sender_email: &str,
        receiver_email: &str,
        text: String,
    ) -> EngiflowResult<ChatMessage> {
        let message = self
            .collection
            .mutate(move |messages| {
                let message = ChatMessage {
                    id: new_id("msg"),
                    sender_email: sender_email.to_string(),
                    receiver_email: receiver_email.to_string(),
                    text,
                    timestamp: Utc::now(),
                    organization_id: org_id.to_string(),
                };
                messages.push(message.clone());
                Ok(message)
            })
            .await?;

        debug!(id = %message.id, org_id, "Chat message stored");
        Ok(message)
    }

    async fn list(&self, org_id: &str) -> EngiflowResult<Vec<ChatMessage>> {
        Ok(self.collection.read(|messages| {
            messages
                .iter()
                .filter(|m| m.organization_id == org_id)
                .cloned()
                .collect()
        }))
    }

    async fn conversation(&self, org_id: &str, a: &str, b: &str) -> EngiflowResult<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self.collection.read(|messages| {
            messages
                .iter()
                .filter(|m| m.organization_id == org_id && m.between(a, b))
                .cloned()
                .collect()
        });
        messages.sort_by(|x, y| x.timestamp.cmp(&y.timestamp));
        Ok(messages)
    }
}
