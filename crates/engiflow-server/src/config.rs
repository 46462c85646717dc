//! Application configuration.
//!
//! Layered with figment: built-in defaults, then an optional
//! `engiflow.toml`, then `ENGIFLOW_*` environment variables. Nested keys
//! use a double underscore, e.g. `ENGIFLOW_DATABASE__URL`.

use std::path::Path;

use engiflow_store::DbConfig;
use engiflow_sync::SyncConfig;
use engiflow_workflow::WorkflowConfig;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "engiflow.toml";
pub const ENV_PREFIX: &str = "ENGIFLOW_";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local; everything is lost on exit.
    #[default]
    Memory,
    /// SurrealDB over WebSocket, see [`DbConfig`].
    Surreal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Without a key the assistant is disabled and every draft fails soft.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub typing_timeout_ms: u64,
    pub scratchpad_autosave_ms: u64,
    pub note_autosave_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            typing_timeout_ms: 2000,
            scratchpad_autosave_ms: 1000,
            note_autosave_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub database: DbConfig,
    pub assistant: AssistantSettings,
    pub timings: Timings,
    pub pepper: Option<String>,
    pub min_password_length: usize,
    /// Populate empty storage with the demo organizations.
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            database: DbConfig::default(),
            assistant: AssistantSettings::default(),
            timings: Timings::default(),
            pepper: None,
            min_password_length: 8,
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    /// Load from `engiflow.toml` in the working directory and the
    /// environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(Path::new(CONFIG_FILE)).extract()
    }

    pub fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            pepper: self.pepper.clone(),
            min_password_length: self.min_password_length,
            ..WorkflowConfig::default()
        }
    }

    pub fn sync(&self) -> SyncConfig {
        SyncConfig::from_millis(
            self.timings.typing_timeout_ms,
            self.timings.scratchpad_autosave_ms,
            self.timings.note_autosave_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|jail| {
            let config: AppConfig = AppConfig::figment(&jail.directory().join("missing.toml"))
                .extract()?;
            assert_eq!(config.storage, StorageKind::Memory);
            assert_eq!(config.min_password_length, 8);
            assert_eq!(config.sync().typing_timeout.as_millis(), 2000);
            assert!(config.seed_demo_data);
            Ok(())
        });
    }

    #[test]
    fn file_then_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                storage = "surreal"
                min_password_length = 10

                [database]
                namespace = "review"

                [timings]
                note_autosave_ms = 500
                "#,
            )?;
            jail.set_env("ENGIFLOW_MIN_PASSWORD_LENGTH", "12");
            jail.set_env("ENGIFLOW_ASSISTANT__MODEL", "gemini-test");

            let config = AppConfig::load()?;
            assert_eq!(config.storage, StorageKind::Surreal);
            assert_eq!(config.database.namespace, "review");
            assert_eq!(config.database.database, "main");
            assert_eq!(config.min_password_length, 12);
            assert_eq!(config.workflow().min_password_length, 12);
            assert_eq!(config.assistant.model.as_deref(), Some("gemini-test"));
            assert_eq!(config.sync().note_autosave.as_millis(), 500);
            assert_eq!(config.sync().scratchpad_autosave.as_millis(), 1000);
            Ok(())
        });
    }
}
