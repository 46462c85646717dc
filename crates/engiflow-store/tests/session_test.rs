//! Integration tests for tab sessions sharing one medium.

use chrono::NaiveDate;
use engiflow_core::EngiflowError;
use engiflow_core::keys::CollectionKey;
use engiflow_core::models::organization::{Organization, Subscription};
use engiflow_core::models::task::{CreateTask, TaskPriority};
use engiflow_core::models::user::{User, UserRole, UserStatus};
use engiflow_core::repository::TaskRepository;
use engiflow_store::{
    MemoryBackend, Repositories, SeedData, SharedMedium, StorageBackend, TabSession, Theme,
};

fn user(email: &str, org: &str) -> User {
    User {
        name: email.split('@').next().unwrap_or_default().into(),
        email: email.into(),
        password_hash: None,
        photo_url: None,
        role: UserRole::Member,
        organization_id: org.into(),
        status: UserStatus::Active,
    }
}

fn seed() -> SeedData {
    SeedData {
        organizations: vec![
            Organization {
                id: "org_a".into(),
                name: "Alpha".into(),
                subscription: Subscription::free(),
            },
            Organization {
                id: "org_b".into(),
                name: "Beta".into(),
                subscription: Subscription::free(),
            },
        ],
        users: vec![user("ann@a.com", "org_a"), user("bob@b.com", "org_b")],
        ..SeedData::default()
    }
}

fn task(email: &str, org: &str, title: &str) -> CreateTask {
    CreateTask {
        user_email: email.into(),
        date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        title: title.into(),
        priority: TaskPriority::Medium,
        organization_id: org.into(),
    }
}

#[tokio::test]
async fn signed_in_email_survives_into_a_new_tab() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let first = TabSession::open(&medium, seed()).await;
    first.sign_in(user("ann@a.com", "org_a")).await.unwrap();

    let second = TabSession::open(&medium, seed()).await;
    let restored = second.restore().await.unwrap();
    assert_eq!(restored.email, "ann@a.com");
    assert_eq!(second.current_organization().unwrap().id, "org_a");

    first.sign_out().await.unwrap();
    let third = TabSession::open(&medium, seed()).await;
    assert!(third.restore().await.is_none());
}

#[tokio::test]
async fn reads_require_a_signed_in_user() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let session = TabSession::open(&medium, seed()).await;

    let err = session.organization_users().unwrap_err();
    assert!(matches!(err, EngiflowError::TenantContext));
}

#[tokio::test]
async fn session_reads_are_tenant_scoped() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let session = TabSession::open(&medium, seed()).await;
    let repos = Repositories::new(session.collections());
    repos.tasks.create(task("ann@a.com", "org_a", "mine")).await.unwrap();
    repos.tasks.create(task("bob@b.com", "org_b", "theirs")).await.unwrap();

    session.sign_in(user("ann@a.com", "org_a")).await.unwrap();

    let users = session.organization_users().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users.iter().all(|u| u.organization_id == "org_a"));
    let tasks = session.my_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "mine");
    assert!(session.organization_projects().unwrap().is_empty());
    assert!(session.my_notes().unwrap().is_empty());
}

#[tokio::test]
async fn theme_defaults_to_light() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let session = TabSession::open(&medium, seed()).await;
    assert_eq!(session.theme().await, Theme::Light);

    session.set_theme(Theme::Dark).await.unwrap();
    assert_eq!(session.theme().await, Theme::Dark);
}

/// Two tabs each read-modify-write the whole task collection from their
/// own cache. Without an intervening sync, the later write overwrites the
/// earlier one and its task is lost.
#[tokio::test]
async fn concurrent_writes_from_two_tabs_lose_one_update() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let tab_a = TabSession::open(&medium, seed()).await;
    let tab_b = TabSession::open(&medium, seed()).await;
    let repos_a = Repositories::new(tab_a.collections());
    let repos_b = Repositories::new(tab_b.collections());

    repos_a.tasks.create(task("ann@a.com", "org_a", "from A")).await.unwrap();
    repos_b.tasks.create(task("ann@a.com", "org_a", "from B")).await.unwrap();

    let stored = medium
        .backend()
        .get(CollectionKey::Tasks.as_str())
        .await
        .unwrap()
        .unwrap_or_default();
    assert!(stored.contains("from B"));
    assert!(!stored.contains("from A"));
}

#[tokio::test]
async fn applying_the_change_signal_avoids_the_lost_update() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let tab_a = TabSession::open(&medium, seed()).await;
    let tab_b = TabSession::open(&medium, seed()).await;
    let mut b_events = tab_b.store().storage().subscribe();
    let repos_a = Repositories::new(tab_a.collections());
    let repos_b = Repositories::new(tab_b.collections());

    repos_a.tasks.create(task("ann@a.com", "org_a", "from A")).await.unwrap();
    let event = b_events.try_recv().unwrap();
    let key = CollectionKey::parse(&event.key).unwrap();
    tab_b
        .collections()
        .replace_from_json(key, event.new_value.as_deref().unwrap())
        .unwrap();
    repos_b.tasks.create(task("ann@a.com", "org_a", "from B")).await.unwrap();

    assert_eq!(tab_b.collections().tasks.len(), 2);
}

#[tokio::test]
async fn first_open_persists_the_seed() {
    let medium = SharedMedium::new(MemoryBackend::new());
    let _first = TabSession::open(&medium, seed()).await;

    let stored = medium
        .backend()
        .get(CollectionKey::Users.as_str())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.contains("ann@a.com"));

    let second = TabSession::open(&medium, SeedData::default()).await;
    second.sign_in(user("ann@a.com", "org_a")).await.unwrap();
    assert_eq!(second.organization_users().unwrap().len(), 1);
}
