//! EngiFlow Server: configuration, demo data and the per-tab
//! application wiring used by the `engiflow` binary.

pub mod app;
pub mod config;
pub mod error;
pub mod seed;

pub use app::App;
pub use config::{AppConfig, StorageKind};
pub use error::ServerError;
