//! Demo data written to empty storage on first start.

use chrono::{DateTime, TimeZone, Utc};
use engiflow_core::models::document::{
    Document, DocumentDiscipline, DocumentStatus, HistoryEntry, Reviewer, ReviewerRole,
};
use engiflow_core::models::organization::{
    Organization, Subscription, SubscriptionPlan, SubscriptionStatus,
};
use engiflow_core::models::project::Project;
use engiflow_core::models::user::{User, UserRole, UserStatus};
use engiflow_store::SeedData;
use engiflow_workflow::WorkflowError;
use engiflow_workflow::password::hash_password;

pub const ORG_ALPHA: &str = "org_alpha_123";
pub const ORG_BETA: &str = "org_beta_456";
pub const DEMO_PASSWORD: &str = "password123";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn organization(id: &str, name: &str, plan: SubscriptionPlan, member_limit: u32) -> Organization {
    Organization {
        id: id.into(),
        name: name.into(),
        subscription: Subscription {
            plan,
            status: SubscriptionStatus::Active,
            member_limit,
        },
    }
}

struct Person<'a> {
    name: &'a str,
    email: &'a str,
    role: UserRole,
    org: &'a str,
    active: bool,
}

const PEOPLE: &[Person<'static>] = &[
    Person { name: "Alice Johnson", email: "alice.johnson@example.com", role: UserRole::Admin, org: ORG_ALPHA, active: true },
    Person { name: "Bob Manager", email: "bob.manager@example.com", role: UserRole::Member, org: ORG_ALPHA, active: true },
    Person { name: "Charlie Lead", email: "charlie.lead@example.com", role: UserRole::Member, org: ORG_ALPHA, active: true },
    Person { name: "Diana Prince", email: "diana.prince@example.com", role: UserRole::Member, org: ORG_ALPHA, active: true },
    Person { name: "Frank Castle", email: "frank.castle@example.com", role: UserRole::Member, org: ORG_ALPHA, active: false },
    Person { name: "David Chen", email: "david.chen@example.com", role: UserRole::Admin, org: ORG_BETA, active: true },
    Person { name: "Eve Williams", email: "eve.williams@example.com", role: UserRole::Member, org: ORG_BETA, active: true },
];

/// Two organizations (Pro and Free), their members, one project each and
/// a document in review. Active demo users share [`DEMO_PASSWORD`];
/// Frank is invited but has not chosen a password.
pub fn demo_seed(pepper: Option<&str>) -> Result<SeedData, WorkflowError> {
    let mut users = Vec::with_capacity(PEOPLE.len());
    for p in PEOPLE {
        let password_hash = if p.active {
            Some(hash_password(DEMO_PASSWORD, pepper)?)
        } else {
            None
        };
        users.push(User {
            name: p.name.into(),
            email: p.email.into(),
            password_hash,
            photo_url: Some(format!("https://i.pravatar.cc/150?u={}", p.email)),
            role: p.role,
            organization_id: p.org.into(),
            status: if p.active {
                UserStatus::Active
            } else {
                UserStatus::Pending
            },
        });
    }
    let user = |email: &str| users.iter().find(|u| u.email == email).cloned();
    let (Some(alice), Some(david), Some(eve)) = (
        user("alice.johnson@example.com"),
        user("david.chen@example.com"),
        user("eve.williams@example.com"),
    ) else {
        return Err(WorkflowError::MissingField("demo user"));
    };

    let projects = vec![
        Project {
            id: "proj-1".into(),
            name: "Riverside Bridge Retrofit".into(),
            description: "Seismic retrofit of the Riverside pedestrian bridge.".into(),
            project_code: "RBR-001".into(),
            team: vec![
                alice.email.clone(),
                "bob.manager@example.com".into(),
                "charlie.lead@example.com".into(),
            ],
            last_updated: at(2024, 7, 2, 10, 30),
            organization_id: ORG_ALPHA.into(),
        },
        Project {
            id: "proj-3".into(),
            name: "Downtown Tower".into(),
            description: "Structural integrity assessment for the new downtown high-rise.".into(),
            project_code: "DTT-001".into(),
            team: vec![david.email.clone(), eve.email.clone()],
            last_updated: at(2023, 10, 29, 9, 5),
            organization_id: ORG_BETA.into(),
        },
    ];

    let documents = vec![
        Document {
            id: "doc-1".into(),
            name: "Pier_Foundation_Detail.pdf".into(),
            doc_type: "PDF".into(),
            uploaded_by: alice.snapshot(),
            upload_date: at(2024, 7, 2, 10, 30),
            status: DocumentStatus::InReview,
            reviewers: vec![
                Reviewer {
                    email: "bob.manager@example.com".into(),
                    role: ReviewerRole::Approver,
                },
                Reviewer {
                    email: "charlie.lead@example.com".into(),
                    role: ReviewerRole::Commenter,
                },
            ],
            password_hash: None,
            history: vec![HistoryEntry {
                status: DocumentStatus::InReview,
                date: at(2024, 7, 2, 10, 30),
                user: alice.name.clone(),
                user_email: alice.email.clone(),
                comment: "Document Revision 0 created and sent for review.".into(),
                version: 0,
            }],
            reminder_date: None,
            project_code: Some("RBR-001".into()),
            version: 0,
            is_latest: true,
            file_url: None,
            discipline: DocumentDiscipline::Structural,
            organization_id: ORG_ALPHA.into(),
            scratchpad_content: String::new(),
        },
        Document {
            id: "doc-3".into(),
            name: "Foundation_Plan_Rev2.pdf".into(),
            doc_type: "PDF".into(),
            uploaded_by: david.snapshot(),
            upload_date: at(2023, 10, 29, 9, 0),
            status: DocumentStatus::Rejected,
            reviewers: vec![Reviewer {
                email: eve.email.clone(),
                role: ReviewerRole::Approver,
            }],
            password_hash: Some(hash_password("password789", pepper)?),
            history: vec![
                HistoryEntry {
                    status: DocumentStatus::Rejected,
                    date: at(2023, 10, 29, 16, 45),
                    user: eve.name.clone(),
                    user_email: eve.email.clone(),
                    comment: "Load calculations on page 5 are incorrect. Please revise.".into(),
                    version: 0,
                },
                HistoryEntry {
                    status: DocumentStatus::InReview,
                    date: at(2023, 10, 29, 9, 5),
                    user: david.name.clone(),
                    user_email: david.email.clone(),
                    comment: "Final check before submission.".into(),
                    version: 0,
                },
            ],
            reminder_date: None,
            project_code: Some("DTT-001".into()),
            version: 0,
            is_latest: true,
            file_url: None,
            discipline: DocumentDiscipline::Civil,
            organization_id: ORG_BETA.into(),
            scratchpad_content: "This is a shared scratchpad for the foundation plan.".into(),
        },
    ];

    Ok(SeedData {
        organizations: vec![
            organization(ORG_ALPHA, "Innovatech Engineering", SubscriptionPlan::Pro, 1000),
            organization(ORG_BETA, "Apex Structural Solutions", SubscriptionPlan::Free, 5),
        ],
        users,
        documents,
        projects,
    })
}
