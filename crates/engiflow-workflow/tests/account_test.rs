//! Integration tests for accounts, projects and personal records.

use std::sync::Arc;

use chrono::NaiveDate;
use engiflow_core::EngiflowError;
use engiflow_core::models::document::{DocumentDiscipline, NewDocument, Reviewer, ReviewerRole};
use engiflow_core::models::organization::SubscriptionPlan;
use engiflow_core::models::task::TaskPriority;
use engiflow_core::models::user::{User, UserRole, UserStatus};
use engiflow_core::repository::{DocumentRepository, OrganizationRepository};
use engiflow_store::repository::{
    StoreMessageRepository, StoreNoteRepository, StoreNotificationRepository,
    StoreOrganizationRepository, StoreTaskRepository, StoreUserRepository,
};
use engiflow_store::{MemoryBackend, Repositories, SeedData, SharedMedium, TabSession};
use engiflow_workflow::{
    AccountService, Assistant, AssistantError, LoginInput, NoteFormat, PersonalService,
    ProjectInput, ProjectService, RegisterInput, TextGenerator, UpdateProfile, WorkflowConfig,
};

struct Echo;

impl TextGenerator for Echo {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        Ok(format!("converted {} chars", prompt.len()))
    }
}

type Accounts = AccountService<StoreOrganizationRepository<MemoryBackend>, StoreUserRepository<MemoryBackend>>;

type Personal = PersonalService<
    StoreTaskRepository<MemoryBackend>,
    StoreNoteRepository<MemoryBackend>,
    StoreMessageRepository<MemoryBackend>,
    StoreNotificationRepository<MemoryBackend>,
    Echo,
>;

async fn tab() -> Arc<TabSession<MemoryBackend>> {
    let medium = SharedMedium::new(MemoryBackend::new());
    TabSession::open(&medium, SeedData::default()).await
}

fn accounts(tab: &TabSession<MemoryBackend>) -> Accounts {
    let repos = Repositories::new(tab.collections());
    AccountService::new(repos.organizations, repos.users, WorkflowConfig::default())
}

fn personal(tab: &TabSession<MemoryBackend>) -> Personal {
    let repos = Repositories::new(tab.collections());
    PersonalService::new(
        repos.tasks,
        repos.notes,
        repos.messages,
        repos.notifications,
        Arc::new(Assistant::new(Echo)),
    )
}

fn registration(email: &str, org: &str) -> RegisterInput {
    RegisterInput {
        name: "Alice Admin".into(),
        email: email.into(),
        password: "correct-horse".into(),
        organization_name: org.into(),
    }
}

fn login(org: &str, email: &str, password: &str) -> LoginInput {
    LoginInput {
        organization_name: org.into(),
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn registration_creates_a_free_organization_with_an_admin() {
    let tab = tab().await;
    let accounts = accounts(&tab);

    let admin = accounts
        .register(registration("alice@acme.test", "Acme Engineering"))
        .await
        .unwrap();

    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(admin.status, UserStatus::Active);
    assert!(admin.organization_id.starts_with("org_"));

    let repos = Repositories::new(tab.collections());
    let org = repos
        .organizations
        .get_by_id(&admin.organization_id)
        .await
        .unwrap();
    assert_eq!(org.subscription.plan, SubscriptionPlan::Free);
    assert_eq!(org.subscription.member_limit, 5);
}

#[tokio::test]
async fn registration_rejects_duplicates_and_short_passwords() {
    let tab = tab().await;
    let accounts = accounts(&tab);
    accounts
        .register(registration("alice@acme.test", "Acme Engineering"))
        .await
        .unwrap();

    let err = accounts
        .register(registration("ALICE@acme.test", "Other Org"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));

    let err = accounts
        .register(registration("bob@acme.test", "  acme engineering "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));

    let mut short = registration("bob@acme.test", "Bob Co");
    short.password = "short".into();
    let err = accounts.register(short).await.unwrap_err();
    assert!(matches!(err, EngiflowError::Validation { .. }));
}

#[tokio::test]
async fn login_matches_names_case_insensitively_with_a_uniform_error() {
    let tab = tab().await;
    let accounts = accounts(&tab);
    accounts
        .register(registration("alice@acme.test", "Acme Engineering"))
        .await
        .unwrap();

    let user = accounts
        .login(login("  ACME engineering ", "Alice@Acme.test", "correct-horse"))
        .await
        .unwrap();
    assert_eq!(user.email, "alice@acme.test");

    let wrong_password = accounts
        .login(login("Acme Engineering", "alice@acme.test", "nope-nope"))
        .await
        .unwrap_err();
    let wrong_org = accounts
        .login(login("Nowhere", "alice@acme.test", "correct-horse"))
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, EngiflowError::AuthenticationFailed { .. }));
    assert_eq!(wrong_password.to_string(), wrong_org.to_string());
}

#[tokio::test]
async fn invited_member_signs_in_then_sets_a_password() {
    let tab = tab().await;
    let accounts = accounts(&tab);
    let admin = accounts
        .register(registration("alice@acme.test", "Acme"))
        .await
        .unwrap();

    let invited = accounts
        .invite(&admin, "bob.builder@acme.test", UserRole::Member)
        .await
        .unwrap();
    assert_eq!(invited.name, "bob.builder");
    assert_eq!(invited.status, UserStatus::Pending);

    let pending = accounts
        .login(login("Acme", "bob.builder@acme.test", ""))
        .await
        .unwrap();
    assert_eq!(pending.status, UserStatus::Pending);

    let err = accounts.set_password(&pending, "1234567").await.unwrap_err();
    assert!(matches!(err, EngiflowError::Validation { .. }));
    let active = accounts.set_password(&pending, "12345678").await.unwrap();
    assert_eq!(active.status, UserStatus::Active);

    assert!(accounts
        .login(login("Acme", "bob.builder@acme.test", ""))
        .await
        .is_err());
    assert!(accounts
        .login(login("Acme", "bob.builder@acme.test", "12345678"))
        .await
        .is_ok());

    let err = accounts
        .invite(&admin, "BOB.builder@acme.test", UserRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AlreadyExists { .. }));
}

#[tokio::test]
async fn member_limit_applies_until_upgrade() {
    let tab = tab().await;
    let accounts = accounts(&tab);
    let admin = accounts
        .register(registration("alice@acme.test", "Acme"))
        .await
        .unwrap();
    for i in 0..4 {
        accounts
            .invite(&admin, &format!("m{i}@acme.test"), UserRole::Member)
            .await
            .unwrap();
    }

    let err = accounts
        .invite(&admin, "extra@acme.test", UserRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::AuthorizationDenied { .. }));

    let member = accounts
        .login(login("Acme", "m0@acme.test", ""))
        .await
        .unwrap();
    assert!(accounts.upgrade_plan(&member).await.is_err());
    assert!(accounts.invite(&member, "x@acme.test", UserRole::Member).await.is_err());

    let org = accounts.upgrade_plan(&admin).await.unwrap();
    assert!(org.is_pro());
    assert_eq!(org.subscription.member_limit, 1000);
    assert!(accounts
        .invite(&admin, "extra@acme.test", UserRole::Member)
        .await
        .is_ok());
    assert_eq!(accounts.members(&admin).await.unwrap().len(), 6);
}

#[tokio::test]
async fn profile_updates_keep_the_password() {
    let tab = tab().await;
    let accounts = accounts(&tab);
    let admin = accounts
        .register(registration("alice@acme.test", "Acme"))
        .await
        .unwrap();

    let updated = accounts
        .update_profile(
            &admin,
            UpdateProfile {
                name: Some(" Alice A. ".into()),
                photo_url: Some("https://example.test/a.png".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Alice A.");
    assert_eq!(updated.password_hash, admin.password_hash);
}

fn member_of(org: &str, role: UserRole) -> User {
    User {
        name: "Pat".into(),
        email: "pat@acme.test".into(),
        password_hash: None,
        photo_url: None,
        role,
        organization_id: org.into(),
        status: UserStatus::Active,
    }
}

#[tokio::test]
async fn deleting_a_project_removes_its_documents() {
    let tab = tab().await;
    let repos = Repositories::new(tab.collections());
    let service_repos = Repositories::new(tab.collections());
    let projects = ProjectService::new(service_repos.projects, service_repos.documents);
    let admin = member_of("org-1", UserRole::Admin);
    let member = member_of("org-1", UserRole::Member);

    projects
        .create(
            &member,
            ProjectInput {
                name: "Bridge".into(),
                description: "Retrofit".into(),
                project_code: "BR-1".into(),
                team: vec![],
            },
        )
        .await
        .unwrap();
    let duplicate = projects
        .create(
            &member,
            ProjectInput {
                name: "Other".into(),
                description: String::new(),
                project_code: "br-1".into(),
                team: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, EngiflowError::AlreadyExists { .. }));

    repos
        .documents
        .create_revision(
            "org-1",
            NewDocument {
                name: "Deck.pdf".into(),
                doc_type: "PDF".into(),
                uploaded_by: member.snapshot(),
                reviewers: vec![Reviewer {
                    email: "r@acme.test".into(),
                    role: ReviewerRole::Approver,
                }],
                password_hash: None,
                project_code: Some("BR-1".into()),
                file_url: None,
                discipline: DocumentDiscipline::Civil,
                reminder_date: None,
            },
        )
        .await
        .unwrap();

    let err = projects.delete(&member, "BR-1").await.unwrap_err();
    assert!(matches!(err, EngiflowError::AuthorizationDenied { .. }));

    assert_eq!(projects.delete(&admin, "BR-1").await.unwrap(), 1);
    assert!(projects.list(&admin).await.unwrap().is_empty());
    assert!(repos.documents.list("org-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn personal_records_validate_and_stay_private() {
    let tab = tab().await;
    let personal = personal(&tab);
    let pat = member_of("org-1", UserRole::Member);
    let mut sam = member_of("org-1", UserRole::Member);
    sam.email = "sam@acme.test".into();
    let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();

    let err = personal
        .add_task(&pat, "   ", date, TaskPriority::High)
        .await
        .unwrap_err();
    assert!(matches!(err, EngiflowError::Validation { .. }));
    let task = personal
        .add_task(&pat, " Site visit ", date, TaskPriority::High)
        .await
        .unwrap();
    assert_eq!(task.title, "Site visit");
    assert!(personal.toggle_task(&sam, &task.id).await.is_err());
    assert!(personal.toggle_task(&pat, &task.id).await.unwrap().is_completed);

    let note = personal.new_note(&pat).await.unwrap();
    assert_eq!(note.title, "Untitled Note");
    personal
        .save_note(&pat, &note.id, "Loads".into(), "<p><b>5 kN</b></p>".into())
        .await
        .unwrap();
    assert!(personal.delete_note(&sam, &note.id).await.is_err());
    let converted = personal
        .convert_note(&pat, &note.id, NoteFormat::Markdown)
        .await
        .unwrap();
    assert!(converted.starts_with("converted"));

    assert!(personal.send_message(&pat, &sam.email, "  ").await.is_err());
    let message = personal
        .send_message(&pat, &sam.email, "  hello  ")
        .await
        .unwrap();
    assert_eq!(message.text, "hello");
    let conversation = personal.conversation(&sam, &pat.email).await.unwrap();
    assert_eq!(conversation.len(), 1);
}
