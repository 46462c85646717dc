//! Tenant scoping.
//!
//! All tenants' data physically lives side by side in the same store.
//! Isolation is enforced only here, at the read boundary: every read passes
//! through a [`TenantScope`] built from the signed-in user.

use crate::models::{
    document::Document, message::ChatMessage, note::Note, notification::Notification,
    organization::Organization, project::Project, task::Task, user::User,
};

/// An entity owned by exactly one organization.
pub trait TenantScoped {
    fn organization_id(&self) -> &str;
}

macro_rules! tenant_scoped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TenantScoped for $ty {
                fn organization_id(&self) -> &str {
                    &self.organization_id
                }
            }
        )*
    };
}

tenant_scoped!(User, Document, Project, Task, Note, ChatMessage, Notification);

impl TenantScoped for Organization {
    fn organization_id(&self) -> &str {
        &self.id
    }
}

/// Read filter for a single organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    organization_id: String,
}

impl TenantScope {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.organization_id.clone())
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn contains<T: TenantScoped>(&self, item: &T) -> bool {
        item.organization_id() == self.organization_id
    }

    pub fn filter<T: TenantScoped>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().filter(|i| self.contains(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;
    use chrono::NaiveDate;

    fn task(id: &str, org: &str) -> Task {
        Task {
            id: id.into(),
            user_email: "a@example.com".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 26).unwrap(),
            title: id.into(),
            is_completed: false,
            priority: TaskPriority::Low,
            organization_id: org.into(),
        }
    }

    #[test]
    fn filter_drops_foreign_tenants() {
        let scope = TenantScope::new("org-a");
        let items = vec![task("1", "org-a"), task("2", "org-b"), task("3", "org-a")];
        let visible = scope.filter(items);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|t| t.organization_id == "org-a"));
    }
}
