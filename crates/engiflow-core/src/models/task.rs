//! Personal calendar tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Owner.
    pub user_email: String,
    pub date: NaiveDate,
    pub title: String,
    pub is_completed: bool,
    pub priority: TaskPriority,
    pub organization_id: String,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_email: String,
    pub date: NaiveDate,
    pub title: String,
    pub priority: TaskPriority,
    pub organization_id: String,
}
