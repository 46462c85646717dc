//! Project domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unique within the organization, compared case-insensitively.
    pub project_code: String,
    /// Member emails.
    pub team: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub organization_id: String,
}

impl Project {
    pub fn has_code(&self, code: &str) -> bool {
        self.project_code.eq_ignore_ascii_case(code)
    }
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub project_code: String,
    pub team: Vec<String>,
    pub organization_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub team: Option<Vec<String>>,
}
