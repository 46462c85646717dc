//! Organization domain model.
//!
//! Organizations are the tenant boundary. Every other entity carries an
//! `organizationId` and must never be visible outside its organization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionPlan {
    Free,
    Pro,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    /// Maximum number of users (active or pending) the organization may hold.
    pub member_limit: u32,
}

impl Subscription {
    /// The plan every newly registered organization starts on.
    pub fn free() -> Self {
        Self {
            plan: SubscriptionPlan::Free,
            status: SubscriptionStatus::Active,
            member_limit: 5,
        }
    }
}

/// A tenant: a company or team sharing documents, projects and users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    /// Human-readable name, unique across the deployment (case-insensitive).
    pub name: String,
    pub subscription: Subscription,
}

impl Organization {
    /// Real-time collaboration and AI summaries are Pro-only.
    pub fn is_pro(&self) -> bool {
        self.subscription.plan == SubscriptionPlan::Pro
    }
}

/// Fields required to create a new organization.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub subscription: Subscription,
}
