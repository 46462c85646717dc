//! EngiFlow: application entry point.

use std::sync::Arc;

use engiflow_server::seed::demo_seed;
use engiflow_server::{App, AppConfig, ServerError, StorageKind};
use engiflow_store::{MemoryBackend, SeedData, SharedMedium, StorageBackend};
use engiflow_workflow::{Assistant, GeminiClient};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("engiflow=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting EngiFlow...");

    if let Err(e) = run().await {
        error!(error = %e, "EngiFlow failed to start");
        std::process::exit(1);
    }

    info!("EngiFlow stopped.");
}

async fn run() -> Result<(), ServerError> {
    let config = AppConfig::load()?;

    let seed = if config.seed_demo_data {
        demo_seed(config.pepper.as_deref())?
    } else {
        SeedData::default()
    };

    match config.storage {
        StorageKind::Memory => {
            warn!("Using in-memory storage; data is lost on exit");
            serve(SharedMedium::new(MemoryBackend::new()), seed, &config).await
        }
        StorageKind::Surreal => {
            let backend = engiflow_store::connect(&config.database)
                .await
                .map_err(|e| ServerError::Storage(e.to_string()))?;
            serve(SharedMedium::new(backend), seed, &config).await
        }
    }
}

async fn serve<B: StorageBackend>(
    medium: Arc<SharedMedium<B>>,
    seed: SeedData,
    config: &AppConfig,
) -> Result<(), ServerError> {
    let settings = &config.assistant;
    if settings.api_key.is_none() {
        warn!("No assistant API key configured; e-mail drafts and summaries will fail");
    }
    let assistant = Arc::new(Assistant::new(GeminiClient::new(
        settings.api_key.clone().unwrap_or_default(),
        settings.base_url.clone(),
        settings.model.clone(),
    )));

    let app = App::open(&medium, seed, assistant, config.workflow(), config.sync()).await;

    match app.current_user() {
        Ok(user) => info!(email = %user.email, org_id = %user.organization_id, "Session resumed"),
        Err(_) => info!("No active session"),
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ServerError::Storage(format!("signal handler: {e}")))?;
    info!("Shutdown requested");
    Ok(())
}
