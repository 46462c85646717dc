//! Cached-collection implementation of [`ProjectRepository`].

use std::sync::Arc;

use chrono::Utc;
use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::project::{CreateProject, Project, UpdateProject};
use engiflow_core::repository::ProjectRepository;
use tracing::info;

use super::new_id;
use crate::backend::StorageBackend;
use crate::collection::CachedCollection;

pub struct StoreProjectRepository<B: StorageBackend> {
    collection: Arc<CachedCollection<B, Project>>,
}

impl<B: StorageBackend> StoreProjectRepository<B> {
    pub fn new(collection: Arc<CachedCollection<B, Project>>) -> Self {
        Self { collection }
    }
}

impl<B: StorageBackend> ProjectRepository for StoreProjectRepository<B> {
    async fn create(&self, input: CreateProject) -> EngiflowResult<Project> {
        let project = self
            .collection
            .mutate(move |projects| {
                let taken = projects.iter().any(|p| {
                    p.organization_id == input.organization_id && p.has_code(&input.project_code)
                });
                if taken {
                    return Err(EngiflowError::AlreadyExists {
                        entity: "project".into(),
                    });
                }
                let project = Project {
                    id: new_id("proj"),
                    name: input.name,
                    description: input.description,
                    project_code: input.project_code,
                    team: input.team,
                    last_updated: Utc::now(),
                    organization_id: input.organization_id,
                };
                projects.insert(0, project.clone());
                Ok(project)
            })
            .await?;

        info!(
            project_code = %project.project_code,
            org_id = %project.organization_id,
            "Project created"
        );
        Ok(project)
    }

    async fn get_by_code(&self, org_id: &str, code: &str) -> EngiflowResult<Project> {
        self.collection
            .read(|projects| {
                projects
                    .iter()
                    .find(|p| p.organization_id == org_id && p.has_code(code))
                    .cloned()
            })
            .ok_or_else(|| EngiflowError::not_found("project", code))
    }

    async fn update(&self, org_id: &str, id: &str, input: UpdateProject) -> EngiflowResult<Project> {
        self.collection
            .mutate(|projects| {
                let project = projects
                    .iter_mut()
                    .find(|p| p.id == id && p.organization_id == org_id)
                    .ok_or_else(|| EngiflowError::not_found("project", id))?;
                if let Some(name) = input.name {
                    project.name = name;
                }
                if let Some(description) = input.description {
                    project.description = description;
                }
                if let Some(team) = input.team {
                    project.team = team;
                }
                project.last_updated = Utc::now();
                Ok(project.clone())
            })
            .await
    }

    async fn delete_by_code(&self, org_id: &str, code: &str) -> EngiflowResult<()> {
        self.collection
            .mutate(|projects| {
                let before = projects.len();
                projects.retain(|p| !(p.organization_id == org_id && p.has_code(code)));
                if projects.len() == before {
                    return Err(EngiflowError::not_found("project", code));
                }
                Ok(())
            })
            .await
    }

    async fn list(&self, org_id: &str) -> EngiflowResult<Vec<Project>> {
        Ok(self.collection.read(|projects| {
            projects
                .iter()
                .filter(|p| p.organization_id == org_id)
                .cloned()
                .collect()
        }))
    }
}
