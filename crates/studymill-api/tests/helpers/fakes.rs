//! In-process stand-ins for the pipeline's collaborators, with fault injection and
//! call recording.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use studymill_core::{GeneratedMaterial, NewGeneratedMaterial};
use studymill_db::{PersistenceError, ResultStore};
use studymill_processing::{DocumentKind, ExtractionError, TextExtractor};
use studymill_services::{GenerationClient, GenerationError};
use studymill_storage::{
    ArtifactStore, LocalArtifactStore, StorageResult, UploadedArtifact,
};
use uuid::Uuid;

/// Local artifact store that records every put and every removal per key.
pub struct CountingArtifactStore {
    inner: LocalArtifactStore,
    puts: Mutex<Vec<String>>,
    removals: Mutex<HashMap<String, usize>>,
}

impl CountingArtifactStore {
    pub async fn new(base_path: &Path) -> Self {
        Self {
            inner: LocalArtifactStore::new(base_path)
                .await
                .expect("Failed to create local artifact store"),
            puts: Mutex::new(Vec::new()),
            removals: Mutex::new(HashMap::new()),
        }
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn removal_count(&self, key: &str) -> usize {
        self.removals.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Number of files currently left in the upload directory
    pub fn files_on_disk(&self) -> usize {
        std::fs::read_dir(self.inner.base_path())
            .expect("upload dir readable")
            .count()
    }

    /// Every stored artifact was removed exactly once and nothing is left on disk
    pub fn assert_all_removed_exactly_once(&self) {
        for key in self.put_keys() {
            assert_eq!(
                self.removal_count(&key),
                1,
                "artifact {} should be removed exactly once",
                key
            );
        }
        assert_eq!(self.files_on_disk(), 0, "upload directory should be empty");
    }
}

#[async_trait]
impl ArtifactStore for CountingArtifactStore {
    async fn put(
        &self,
        field: &str,
        original_name: &str,
        declared_mime_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadedArtifact> {
        let artifact = self
            .inner
            .put(field, original_name, declared_mime_type, data)
            .await?;
        self.puts.lock().unwrap().push(artifact.key.clone());
        Ok(artifact)
    }

    async fn read(&self, artifact: &UploadedArtifact) -> StorageResult<Vec<u8>> {
        self.inner.read(artifact).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        *self
            .removals
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;
        self.inner.remove(key)
    }
}

/// Extractor that always fails, as a corrupt document would.
pub struct FailingExtractor;

#[async_trait]
impl TextExtractor for FailingExtractor {
    async fn extract(&self, kind: DocumentKind, _data: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::Malformed {
            kind,
            reason: "injected failure".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum GeneratorBehavior {
    /// Reply with a fixed completion
    Reply(String),
    /// Reply with the prompt itself
    Echo,
    /// Fail as an unavailable upstream would
    Fail,
    /// Reply with a fixed completion after a delay
    Slow(Duration, String),
}

/// Generation client that records prompts and answers per its behavior.
pub struct FakeGenerator {
    behavior: GeneratorBehavior,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(behavior: GeneratorBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for FakeGenerator {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        // Yield so concurrent requests interleave
        tokio::task::yield_now().await;

        match &self.behavior {
            GeneratorBehavior::Reply(text) => Ok(text.clone()),
            GeneratorBehavior::Echo => Ok(prompt.to_string()),
            GeneratorBehavior::Fail => Err(GenerationError::Status {
                status: 503,
                body: "model is loading".to_string(),
            }),
            GeneratorBehavior::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
        }
    }
}

/// Result store kept in memory, optionally failing writes or readiness.
#[derive(Default)]
pub struct InMemoryResultStore {
    records: Mutex<Vec<GeneratedMaterial>>,
    fail_insert: bool,
    fail_ping: bool,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_inserts() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    pub fn failing_ping() -> Self {
        Self {
            fail_ping: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<GeneratedMaterial> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn insert(
        &self,
        material: NewGeneratedMaterial,
    ) -> Result<GeneratedMaterial, PersistenceError> {
        if self.fail_insert {
            return Err(PersistenceError::Database(sqlx_pool_closed()));
        }

        let saved = GeneratedMaterial {
            id: Uuid::new_v4(),
            filename: material.filename,
            material_type: material.material_type,
            generated_content: material.generated_content,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        if self.fail_ping {
            return Err(PersistenceError::InvalidRow("injected readiness failure".into()));
        }
        Ok(())
    }
}

fn sqlx_pool_closed() -> sqlx::Error {
    sqlx::Error::PoolClosed
}
