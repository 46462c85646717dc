//! Integration tests for the repositories over cached collections.

use std::sync::Arc;

use chrono::Utc;
use engiflow_core::EngiflowError;
use engiflow_core::models::document::{DocumentDiscipline, NewDocument, Reviewer, ReviewerRole};
use engiflow_core::models::notification::Notification;
use engiflow_core::models::organization::{CreateOrganization, Subscription, SubscriptionPlan};
use engiflow_core::models::project::CreateProject;
use engiflow_core::models::user::{CreateUser, User, UserRole, UserStatus};
use engiflow_core::repository::{
    DocumentRepository, MessageRepository, NotificationRepository, OrganizationRepository,
    ProjectRepository, UserRepository,
};
use engiflow_store::repository::SCRATCHPAD_PLACEHOLDER;
use engiflow_store::{MemoryBackend, Repositories, SeedData, SharedMedium, TabSession};

async fn setup() -> (Arc<SharedMedium<MemoryBackend>>, Repositories<MemoryBackend>) {
    let medium = SharedMedium::new(MemoryBackend::new());
    let session = TabSession::open(&medium, SeedData::default()).await;
    let repos = Repositories::new(session.collections());
    (medium, repos)
}

fn uploader(org: &str) -> User {
    User {
        name: "Uma Uploader".into(),
        email: "u1@example.com".into(),
        password_hash: None,
        photo_url: None,
        role: UserRole::Member,
        organization_id: org.into(),
        status: UserStatus::Active,
    }
}

fn new_doc(org: &str, name: &str, project: &str) -> NewDocument {
    NewDocument {
        name: name.into(),
        doc_type: "Specification".into(),
        uploaded_by: uploader(org).snapshot(),
        reviewers: vec![Reviewer {
            email: "r1@example.com".into(),
            role: ReviewerRole::Approver,
        }],
        password_hash: None,
        project_code: Some(project.into()),
        file_url: None,
        discipline: DocumentDiscipline::Mechanical,
        reminder_date: None,
    }
}

fn notification(org: &str, id: &str, doc: &str, to: &str) -> Notification {
    Notification {
        id: id.into(),
        recipient_email: to.into(),
        document_id: doc.into(),
        document_name: "Spec_A.pdf".into(),
        message: "changed".into(),
        timestamp: Utc::now(),
        is_read: false,
        organization_id: org.into(),
    }
}

#[tokio::test]
async fn revisions_increment_version_and_keep_one_latest() {
    let (_medium, repos) = setup().await;

    let first = repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P1"))
        .await
        .unwrap();
    let second = repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P1"))
        .await
        .unwrap();

    assert_eq!(first.version, 0);
    assert_eq!(second.version, 1);
    assert_eq!(second.scratchpad_content, SCRATCHPAD_PLACEHOLDER);
    assert_eq!(
        second.history[0].comment,
        "Document Revision 1 created and sent for review."
    );

    let revisions = repos
        .documents
        .revisions("org_a", "Spec_A.pdf", Some("P1"))
        .await
        .unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].id, second.id);
    let latest: Vec<_> = revisions.iter().filter(|d| d.is_latest).collect();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version, 1);
}

#[tokio::test]
async fn same_name_in_another_project_is_a_separate_group() {
    let (_medium, repos) = setup().await;

    repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P1"))
        .await
        .unwrap();
    let other = repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P2"))
        .await
        .unwrap();

    assert_eq!(other.version, 0);
    let docs = repos.documents.list("org_a").await.unwrap();
    assert!(docs.iter().all(|d| d.is_latest));
}

#[tokio::test]
async fn documents_are_invisible_across_tenants() {
    let (_medium, repos) = setup().await;

    let doc = repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P1"))
        .await
        .unwrap();

    assert!(repos.documents.list("org_b").await.unwrap().is_empty());
    let err = repos.documents.get_by_id("org_b", &doc.id).await.unwrap_err();
    assert!(matches!(err, EngiflowError::NotFound { .. }));

    // A same-named upload in another tenant starts its own revision group.
    let foreign = repos
        .documents
        .create_revision("org_b", new_doc("org_b", "Spec_A.pdf", "P1"))
        .await
        .unwrap();
    assert_eq!(foreign.version, 0);
    assert!(repos.documents.get_by_id("org_a", &doc.id).await.unwrap().is_latest);
}

#[tokio::test]
async fn update_rejects_foreign_document() {
    let (_medium, repos) = setup().await;
    let mut doc = repos
        .documents
        .create_revision("org_a", new_doc("org_a", "Spec_A.pdf", "P1"))
        .await
        .unwrap();

    doc.scratchpad_content = "hijacked".into();
    let err = repos.documents.update("org_b", doc).await.unwrap_err();
    assert!(matches!(err, EngiflowError::NotFound { .. }));
}

#[tokio::test]
async fn organization_names_are_unique_ignoring_case() {
    let (_medium, repos) = setup().await;

    let org = repos
        .organizations
        .create(CreateOrganization {
            name: "Innovatech Engineering".into(),
            subscription: Subscription::free(),
        })
        .await
        .unwrap();
    assert!(org.id.starts_with("org_"));

    let found = repos
        .organizations
        .find_by_name("  innovatech engineering ")
        .await
        .unwrap();
    assert_eq!(found.map(|o| o.id), Some(org.id.clone()));

    let err = repos
        .organizations
        .create(CreateOrganization {
            name: "INNOVATECH ENGINEERING".into(),
            subscription: Subscription::free(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));

    let mut pro = Subscription::free();
    pro.plan = SubscriptionPlan::Pro;
    let upgraded = repos
        .organizations
        .update_subscription(&org.id, pro)
        .await
        .unwrap();
    assert!(upgraded.is_pro());
}

#[tokio::test]
async fn user_email_is_unique_within_organization() {
    let (_medium, repos) = setup().await;
    let input = |org: &str| CreateUser {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password_hash: None,
        role: UserRole::Member,
        organization_id: org.into(),
        status: UserStatus::Pending,
    };

    repos.users.create(input("org_a")).await.unwrap();
    let err = repos.users.create(input("org_a")).await.unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));
    repos.users.create(input("org_b")).await.unwrap();

    assert!(repos.users.email_registered("ADA@example.com").await.unwrap());
    let user = repos
        .users
        .get_by_email("org_a", "Ada@Example.com")
        .await
        .unwrap();
    assert_eq!(user.organization_id, "org_a");
    assert_eq!(repos.users.list("org_a").await.unwrap().len(), 1);
}

#[tokio::test]
async fn project_delete_cascades_to_documents() {
    let (_medium, repos) = setup().await;

    repos
        .projects
        .create(CreateProject {
            name: "Plant".into(),
            description: String::new(),
            project_code: "P1".into(),
            team: vec![],
            organization_id: "org_a".into(),
        })
        .await
        .unwrap();
    let err = repos
        .projects
        .create(CreateProject {
            name: "Plant again".into(),
            description: String::new(),
            project_code: "p1".into(),
            team: vec![],
            organization_id: "org_a".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));

    for name in ["A.pdf", "B.pdf"] {
        repos
            .documents
            .create_revision("org_a", new_doc("org_a", name, "P1"))
            .await
            .unwrap();
    }
    repos
        .documents
        .create_revision("org_a", new_doc("org_a", "C.pdf", "P2"))
        .await
        .unwrap();

    repos.projects.delete_by_code("org_a", "P1").await.unwrap();
    let removed = repos.documents.delete_by_project("org_a", "P1").await.unwrap();

    assert_eq!(removed, 2);
    assert!(repos.projects.list("org_a").await.unwrap().is_empty());
    assert_eq!(repos.documents.list("org_a").await.unwrap().len(), 1);
}

#[tokio::test]
async fn notifications_mark_read_per_user_and_document() {
    let (_medium, repos) = setup().await;

    repos
        .notifications
        .create_many(vec![
            notification("org_a", "n1", "doc-1", "u1@example.com"),
            notification("org_a", "n2", "doc-2", "u1@example.com"),
            notification("org_a", "n3", "doc-1", "r2@example.com"),
        ])
        .await
        .unwrap();

    let changed = repos
        .notifications
        .mark_document_read("org_a", "doc-1", "u1@example.com")
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let changed = repos
        .notifications
        .mark_all_read("org_a", "u1@example.com")
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let others = repos
        .notifications
        .list_for_user("org_a", "r2@example.com")
        .await
        .unwrap();
    assert!(!others[0].is_read);
}

#[tokio::test]
async fn conversation_is_oldest_first_between_two_users() {
    let (_medium, repos) = setup().await;

    repos
        .messages
        .create("org_a", "a@x.com", "b@x.com", "hello".into())
        .await
        .unwrap();
    repos
        .messages
        .create("org_a", "b@x.com", "a@x.com", "hi".into())
        .await
        .unwrap();
    repos
        .messages
        .create("org_a", "a@x.com", "c@x.com", "elsewhere".into())
        .await
        .unwrap();

    let thread = repos
        .messages
        .conversation("org_a", "b@x.com", "a@x.com")
        .await
        .unwrap();
    let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hello", "hi"]);
}
