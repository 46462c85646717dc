use std::sync::Arc;

use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::task::{CreateTask, Task};
use engiflow_core::models::user::same_email;
use engiflow_core::repository::TaskRepository;

use super::new_id;
use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreTaskRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Task>>,
}

impl<B: StorageBackend> StoreTaskRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Task>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> TaskRepository for StoreTaskRepository<B> {
    async fn create(&self, input: CreateTask) -> EngiflowResult<Task> {
        self.collection
            .mutate(move |tasks| {
                let task = Task {
                    id: new_id("task"),
                    user_email: input.user_email,
                    date: input.date,
                    title: input.title,
                    is_completed: false,
                    priority: input.priority,
                    organization_id: input.organization_id,
                };
                tasks.push(task.clone());
                Ok(task)
            })
            .await
    }

    async fn toggle(&self, org_id: &str, id: &str) -> EngiflowResult<Task> {
        self.collection
            .mutate(|tasks| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id && t.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("task", id))?;
                task.is_completed = !task.is_completed;
                Ok(task.clone())
            })
            .await
    }

    async fn delete(&self, org_id: &str, id: &str) -> EngiflowResult<()> {
        self.collection
            .mutate(|tasks| {
                let before = tasks.len();
                tasks.retain(|t| !(t.id == id && t.organization_id == org_id));
                if tasks.len() == before {
                    return Err(EngiflowError::not_found("task", id));
                }
                Ok(())
            })
            .await
    }

    async fn list_for_user(&self, org_id: &str, email: &str) -> EngiflowResult<Vec<Task>> {
        Ok(self.collection.read(|tasks| {
            tasks
                .iter()
                .filter(|t| t.organization_id == org_id && same_email(&t.user_email, email))
                .cloned()
                .collect()
        }))
    }
}
