//! Opening the durable SurrealDB backend.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::backend::SurrealBackend;
use crate::error::StoreError;
use crate::schema::run_migrations;

/// Where the shared key-value entries live. Missing fields take the
/// local development defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "engiflow".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Sign in as root, select the namespace and database, bring the
/// `kv_entry` table up to date, and return it as a storage backend.
pub async fn connect(config: &DbConfig) -> Result<SurrealBackend<Client>, StoreError> {
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Opening SurrealDB storage"
    );

    let db = Surreal::new::<Ws>(&config.url).await?;
    db.signin(Root {
        username: config.username.clone(),
        password: config.password.clone(),
    })
    .await?;
    db.use_ns(&config.namespace).use_db(&config.database).await?;

    run_migrations(&db).await?;
    info!("SurrealDB storage ready");
    Ok(SurrealBackend::new(db))
}
