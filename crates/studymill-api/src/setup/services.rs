//! Service and repository wiring

use crate::services::pipeline::GenerationPipeline;
use crate::state::AppState;
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use studymill_core::Config;
use studymill_db::MaterialRepository;
use studymill_processing::{DocumentTextExtractor, UploadValidator};
use studymill_services::OllamaClient;
use studymill_storage::ArtifactStore;

/// Build the application state from its production collaborators
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    artifacts: Arc<dyn ArtifactStore>,
) -> Result<Arc<AppState>> {
    let generator = OllamaClient::from_config(config)?;
    tracing::info!(
        endpoint = %generator.endpoint(),
        model = %config.ollama_model(),
        timeout_secs = config.generation_timeout_secs(),
        max_concurrency = generator.max_concurrency(),
        "Generation client configured"
    );

    let pipeline = GenerationPipeline::new(
        artifacts,
        Arc::new(DocumentTextExtractor::new()),
        Arc::new(generator),
        Arc::new(MaterialRepository::new(pool)),
        UploadValidator::from_config(config),
    );

    Ok(Arc::new(AppState::new(config.clone(), pipeline)))
}
