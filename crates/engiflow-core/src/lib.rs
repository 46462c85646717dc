//! EngiFlow Core: domain models, error types, storage keys, tenant
//! scoping and repository traits shared by every other crate.

pub mod error;
pub mod insights;
pub mod keys;
pub mod models;
pub mod repository;
pub mod tenancy;

pub use error::{EngiflowError, EngiflowResult};
pub use tenancy::{TenantScope, TenantScoped};
