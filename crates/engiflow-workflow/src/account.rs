//! Account flows: registration, login, activation and organization admin.

use engiflow_core::error::{EngiflowError, EngiflowResult};
use engiflow_core::models::organization::{
    CreateOrganization, Organization, Subscription, SubscriptionPlan,
};
use engiflow_core::models::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};
use engiflow_core::repository::{OrganizationRepository, UserRepository};
use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::password;

#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Debug)]
pub struct LoginInput {
    pub organization_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// Account service.
///
/// Returns users; signing them into a tab session is the caller's job.
pub struct AccountService<O: OrganizationRepository, U: UserRepository> {
    organizations: O,
    users: U,
    config: WorkflowConfig,
}

fn required(value: &str, field: &'static str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        Err(WorkflowError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_admin(actor: &User, action: &str) -> Result<(), WorkflowError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(WorkflowError::NotPermitted(format!(
            "only administrators can {action}"
        )))
    }
}

impl<O: OrganizationRepository, U: UserRepository> AccountService<O, U> {
    pub fn new(organizations: O, users: U, config: WorkflowConfig) -> Self {
        Self {
            organizations,
            users,
            config,
        }
    }

    fn check_length(&self, password: &str) -> Result<(), WorkflowError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(WorkflowError::PasswordTooShort {
                min: self.config.min_password_length,
            });
        }
        Ok(())
    }

    /// Create a Free organization with the registrant as its active Admin.
    pub async fn register(&self, input: RegisterInput) -> EngiflowResult<User> {
        required(&input.name, "name")?;
        required(&input.email, "email")?;
        required(&input.organization_name, "organization name")?;
        self.check_length(&input.password)?;

        if self.users.email_registered(&input.email).await? {
            return Err(EngiflowError::AlreadyExists {
                entity: "user".into(),
            });
        }
        if self
            .organizations
            .find_by_name(&input.organization_name)
            .await?
            .is_some()
        {
            return Err(EngiflowError::AlreadyExists {
                entity: "organization".into(),
            });
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let organization = self
            .organizations
            .create(CreateOrganization {
                name: input.organization_name.trim().to_string(),
                subscription: Subscription {
                    member_limit: self.config.free_member_limit,
                    ..Subscription::free()
                },
            })
            .await?;

        let user = self
            .users
            .create(CreateUser {
                name: input.name.trim().to_string(),
                email: input.email,
                password_hash: Some(password_hash),
                role: UserRole::Admin,
                organization_id: organization.id.clone(),
                status: UserStatus::Active,
            })
            .await?;

        info!(org_id = %organization.id, email = %user.email, "Organization registered");
        Ok(user)
    }

    /// Resolve organization + email + password to a user.
    ///
    /// Pending (invited) users are let in without a password so they can
    /// choose one. Every other failure is the same error.
    pub async fn login(&self, input: LoginInput) -> EngiflowResult<User> {
        let Some(organization) = self
            .organizations
            .find_by_name(&input.organization_name)
            .await?
        else {
            debug!(organization = %input.organization_name, "Login for unknown organization");
            return Err(WorkflowError::InvalidCredentials.into());
        };

        let user = match self.users.get_by_email(&organization.id, &input.email).await {
            Ok(user) => user,
            Err(EngiflowError::NotFound { .. }) => {
                return Err(WorkflowError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if user.status == UserStatus::Pending {
            info!(org_id = %organization.id, email = %user.email, "Pending user signed in");
            return Ok(user);
        }

        let valid = match user.password_hash.as_deref() {
            Some(hash) => password::verify_password(&input.password, hash, self.config.pepper.as_deref())?,
            None => false,
        };
        if !valid {
            warn!(org_id = %organization.id, "Login failed");
            return Err(WorkflowError::InvalidCredentials.into());
        }

        info!(org_id = %organization.id, email = %user.email, "User signed in");
        Ok(user)
    }

    /// Choose a password and activate the account.
    pub async fn set_password(&self, actor: &User, new_password: &str) -> EngiflowResult<User> {
        self.check_length(new_password)?;
        let password_hash = password::hash_password(new_password, self.config.pepper.as_deref())?;
        let user = self
            .users
            .update(
                &actor.organization_id,
                &actor.email,
                UpdateUser {
                    password_hash: Some(password_hash),
                    status: Some(UserStatus::Active),
                    ..Default::default()
                },
            )
            .await?;
        info!(email = %user.email, "Password set");
        Ok(user)
    }

    /// Add a pending member to the actor's organization.
    pub async fn invite(&self, actor: &User, email: &str, role: UserRole) -> EngiflowResult<User> {
        require_admin(actor, "invite members")?;
        let email = email.trim();
        let Some((local, domain)) = email.split_once('@') else {
            return Err(EngiflowError::validation("invalid email address"));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EngiflowError::validation("invalid email address"));
        }

        let organization = self.organizations.get_by_id(&actor.organization_id).await?;
        let members = self.users.list(&organization.id).await?;
        let limit = organization.subscription.member_limit;
        if members.len() as u32 >= limit {
            return Err(WorkflowError::MemberLimitReached { limit }.into());
        }

        let user = self
            .users
            .create(CreateUser {
                name: local.to_string(),
                email: email.to_string(),
                password_hash: None,
                role,
                organization_id: organization.id,
                status: UserStatus::Pending,
            })
            .await?;
        info!(org_id = %user.organization_id, email = %user.email, "Member invited");
        Ok(user)
    }

    pub async fn update_profile(&self, actor: &User, input: UpdateProfile) -> EngiflowResult<User> {
        if let Some(name) = input.name.as_deref() {
            required(name, "name")?;
        }
        self.users
            .update(
                &actor.organization_id,
                &actor.email,
                UpdateUser {
                    name: input.name.map(|n| n.trim().to_string()),
                    photo_url: input.photo_url,
                    ..Default::default()
                },
            )
            .await
    }

    /// Move the actor's organization to the Pro plan.
    pub async fn upgrade_plan(&self, actor: &User) -> EngiflowResult<Organization> {
        require_admin(actor, "change the subscription")?;
        let organization = self.organizations.get_by_id(&actor.organization_id).await?;
        let subscription = Subscription {
            plan: SubscriptionPlan::Pro,
            member_limit: organization
                .subscription
                .member_limit
                .max(self.config.pro_member_limit),
            ..organization.subscription
        };
        let organization = self
            .organizations
            .update_subscription(&organization.id, subscription)
            .await?;
        info!(org_id = %organization.id, "Subscription upgraded to Pro");
        Ok(organization)
    }

    pub async fn members(&self, actor: &User) -> EngiflowResult<Vec<User>> {
        self.users.list(&actor.organization_id).await
    }
}
