//! Project administration.

use engiflow_core::error::EngiflowResult;
use engiflow_core::models::project::{CreateProject, Project, UpdateProject};
use engiflow_core::models::user::User;
use engiflow_core::repository::{DocumentRepository, ProjectRepository};
use tracing::info;

use crate::error::WorkflowError;

#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub name: String,
    pub description: String,
    pub project_code: String,
    pub team: Vec<String>,
}

pub struct ProjectService<P: ProjectRepository, D: DocumentRepository> {
    projects: P,
    documents: D,
}

impl<P: ProjectRepository, D: DocumentRepository> ProjectService<P, D> {
    pub fn new(projects: P, documents: D) -> Self {
        Self {
            projects,
            documents,
        }
    }

    pub async fn create(&self, actor: &User, input: ProjectInput) -> EngiflowResult<Project> {
        let name = input.name.trim();
        let code = input.project_code.trim();
        if name.is_empty() {
            return Err(WorkflowError::MissingField("project name").into());
        }
        if code.is_empty() {
            return Err(WorkflowError::MissingField("project code").into());
        }

        let project = self
            .projects
            .create(CreateProject {
                name: name.to_string(),
                description: input.description.trim().to_string(),
                project_code: code.to_string(),
                team: input.team,
                organization_id: actor.organization_id.clone(),
            })
            .await?;
        info!(org_id = %project.organization_id, code = %project.project_code, "Project created");
        Ok(project)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        input: UpdateProject,
    ) -> EngiflowResult<Project> {
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(WorkflowError::MissingField("project name").into());
        }
        self.projects.update(&actor.organization_id, id, input).await
    }

    /// Delete a project and every document filed under it. Admin only.
    pub async fn delete(&self, actor: &User, code: &str) -> EngiflowResult<usize> {
        if !actor.is_admin() {
            return Err(WorkflowError::NotPermitted(
                "you don't have permission to delete projects".into(),
            )
            .into());
        }
        let org_id = actor.organization_id.as_str();
        self.projects.delete_by_code(org_id, code).await?;
        let removed = self.documents.delete_by_project(org_id, code).await?;
        info!(org_id, code, documents = removed, "Project deleted");
        Ok(removed)
    }

    pub async fn get(&self, actor: &User, code: &str) -> EngiflowResult<Project> {
        self.projects.get_by_code(&actor.organization_id, code).await
    }

    pub async fn list(&self, actor: &User) -> EngiflowResult<Vec<Project>> {
        self.projects.list(&actor.organization_id).await
    }
}
