use crate::keys::ArtifactKeyGenerator;
use crate::traits::{ArtifactStore, StorageError, StorageResult, UploadedArtifact};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const MAX_KEY_ATTEMPTS: usize = 8;

/// Local filesystem artifact store
///
/// Every upload lands directly under `base_path`; there are no nested directories.
pub struct LocalArtifactStore {
    base_path: PathBuf,
    keys: ArtifactKeyGenerator,
}

impl LocalArtifactStore {
    /// Create a new LocalArtifactStore, creating `base_path` if it is missing
    ///
    /// # Arguments
    /// * `base_path` - Directory for transient uploads (e.g., "./uploads")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalArtifactStore {
            base_path,
            keys: ArtifactKeyGenerator::new(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a key to a path inside the upload directory.
    ///
    /// Keys are single path components; anything that could escape `base_path` is rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Open a file that did not exist before, drawing new keys on collision.
    async fn create_unique(
        &self,
        field: &str,
        original_name: &str,
    ) -> StorageResult<(String, PathBuf, fs::File)> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = self.keys.next_key(field, original_name);
            let path = self.key_to_path(&key)?;

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((key, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(key = %key, "Artifact key collision, drawing a new key");
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        Err(StorageError::WriteFailed(format!(
            "Could not allocate a unique key after {} attempts",
            MAX_KEY_ATTEMPTS
        )))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(
        &self,
        field: &str,
        original_name: &str,
        declared_mime_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadedArtifact> {
        let start = std::time::Instant::now();
        let (key, path, mut file) = self.create_unique(field, original_name).await?;
        let size = data.len() as u64;

        let written = async {
            file.write_all(&data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Partial file must not outlive the failed write
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact stored"
        );

        Ok(UploadedArtifact {
            key,
            path,
            original_name: original_name.to_string(),
            declared_mime_type: declared_mime_type.to_string(),
            size,
        })
    }

    async fn read(&self, artifact: &UploadedArtifact) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(&artifact.key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(artifact.key.clone()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), key = %key, "Artifact removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
