//! Result store connection and schema

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use studymill_core::Config;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

fn migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
}

async fn load_migrator() -> Result<Migrator> {
    let dir = migrations_dir();
    Migrator::new(dir.clone())
        .await
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))
}

/// Connect the result store pool and bring the `study_materials` schema up to date
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let migrator = load_migrator().await?;

    let pool = pool_options(config)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;
    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_secs = config.db_timeout_seconds(),
        "Result store connected"
    );

    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        migrations = migrator.iter().count(),
        latest = migrator.iter().map(|m| m.version).max().unwrap_or_default(),
        "Result store schema up to date"
    );

    Ok(pool)
}
