//! Transient upload storage setup

use anyhow::{Context, Result};
use std::sync::Arc;
use studymill_core::Config;
use studymill_storage::{ArtifactStore, LocalArtifactStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ArtifactStore>> {
    let store = LocalArtifactStore::new(config.upload_dir())
        .await
        .context("Failed to initialize upload directory")?;

    tracing::info!(
        upload_dir = %store.base_path().display(),
        "Upload storage ready"
    );

    Ok(Arc::new(store))
}
