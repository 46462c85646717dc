//! Cached-collection implementation of [`OrganizationRepository`].

use std::sync::Arc;

use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::organization::{CreateOrganization, Organization, Subscription};
use engiflow_core::repository::OrganizationRepository;
use tracing::info;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreOrganizationRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Organization>>,
}

impl<B: StorageBackend> StoreOrganizationRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Organization>>) -> Self {
        Self { collection }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl<B: StorageBackend> OrganizationRepository for StoreOrganizationRepository<B> {
    async fn create(&self, input: CreateOrganization) -> EngiflowResult<Organization> {
        let org = self
            .collection
            .mutate(move |orgs| {
                if orgs.iter().any(|o| same_name(&o.name, &input.name)) {
                    return Err(EngiflowError::AlreadyExists {
                        entity: "organization".into(),
                    });
                }
                let org = Organization {
                    id: format!("org_{}", Uuid::new_v4().simple()),
                    name: input.name.trim().to_string(),
                    subscription: input.subscription,
                };
                orgs.push(org.clone());
                Ok(org)
            })
            .await?;

        info!(org_id = %org.id, name = %org.name, "Organization created");
        Ok(org)
    }

    async fn get_by_id(&self, id: &str) -> EngiflowResult<Organization> {
        self.collection
            .read(|orgs| orgs.iter().find(|o| o.id == id).cloned())
            .ok_or_else(|| EngiflowError::not_found("organization", id))
    }

    async fn find_by_name(&self, name: &str) -> EngiflowResult<Option<Organization>> {
        Ok(self
            .collection
            .read(|orgs| orgs.iter().find(|o| same_name(&o.name, name)).cloned()))
    }

    async fn update_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> EngiflowResult<Organization> {
        self.collection
            .mutate(|orgs| {
                let org = orgs
                    .iter_mut()
                    .find(|o| o.id == id)
                    .ok_or_else(|| EngiflowError::not_found("organization", id))?;
                org.subscription = subscription;
                Ok(org.clone())
            })
            .await
    }

    async fn list(&self) -> EngiflowResult<Vec<Organization>> {
        Ok(self.collection.snapshot())
    }
}
