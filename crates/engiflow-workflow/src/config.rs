//! Workflow configuration.

/// Configuration for the account and review workflows.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing and
    /// verification.
    pub pepper: Option<String>,
    /// Minimum password length for account passwords (default: 8).
    pub min_password_length: usize,
    /// Member limit of a newly registered organization (default: 5).
    pub free_member_limit: u32,
    /// Member limit after upgrading to Pro (default: 1000).
    pub pro_member_limit: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            free_member_limit: 5,
            pro_member_limit: 1000,
        }
    }
}
