use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use studymill_core::{AppError, GeneratedMaterial, MaterialType, NewGeneratedMaterial};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid row in study_materials: {0}")]
    InvalidRow(String),
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

/// Durable store for generated material
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert one record. Identifier and creation time are assigned by the store.
    async fn insert(
        &self,
        material: NewGeneratedMaterial,
    ) -> Result<GeneratedMaterial, PersistenceError>;

    /// Check the store can serve writes. Stores without a remote backend are always ready.
    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MaterialRow {
    id: Uuid,
    filename: String,
    material_type: String,
    generated_content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MaterialRow> for GeneratedMaterial {
    type Error = PersistenceError;

    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        let material_type = row
            .material_type
            .parse::<MaterialType>()
            .map_err(|e| PersistenceError::InvalidRow(e.to_string()))?;

        Ok(GeneratedMaterial {
            id: row.id,
            filename: row.filename,
            material_type,
            generated_content: row.generated_content,
            created_at: row.created_at,
        })
    }
}

/// Repository for generated study material
#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a record by ID
    #[tracing::instrument(skip(self), fields(db.table = "study_materials", db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GeneratedMaterial>, PersistenceError> {
        let row = sqlx::query_as::<Postgres, MaterialRow>(
            "SELECT id, filename, material_type, generated_content, created_at FROM study_materials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(GeneratedMaterial::try_from).transpose()
    }
}

#[async_trait]
impl ResultStore for MaterialRepository {
    #[tracing::instrument(
        skip(self, material),
        fields(
            db.table = "study_materials",
            db.operation = "insert",
            material_type = %material.material_type,
            content_len = material.generated_content.len()
        )
    )]
    async fn insert(
        &self,
        material: NewGeneratedMaterial,
    ) -> Result<GeneratedMaterial, PersistenceError> {
        let row = sqlx::query_as::<Postgres, MaterialRow>(
            r#"
            INSERT INTO study_materials (filename, material_type, generated_content)
            VALUES ($1, $2, $3)
            RETURNING id, filename, material_type, generated_content, created_at
            "#,
        )
        .bind(&material.filename)
        .bind(material.material_type.as_str())
        .bind(&material.generated_content)
        .fetch_one(&self.pool)
        .await?;

        let saved = GeneratedMaterial::try_from(row)?;
        tracing::info!(material_id = %saved.id, "Study material saved");

        Ok(saved)
    }

    /// Round-trip to the database, used by the readiness probe
    #[tracing::instrument(skip(self), fields(db.operation = "ping"))]
    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
