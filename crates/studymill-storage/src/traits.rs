//! Artifact store abstraction
//!
//! This module defines the `ArtifactStore` trait that transient upload backends implement.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use studymill_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// An uploaded document materialized for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Unique storage key (also the stored file name)
    pub key: String,
    /// Location on the backing store
    pub path: PathBuf,
    /// File name as submitted by the client
    pub original_name: String,
    /// MIME type as declared by the client
    pub declared_mime_type: String,
    /// Size in bytes
    pub size: u64,
}

impl UploadedArtifact {
    /// Name the artifact was stored under, recorded with the generated material.
    pub fn filename(&self) -> &str {
        &self.key
    }
}

/// Transient artifact storage
///
/// Implementations must give every `put` a key no concurrent or earlier `put` has used,
/// and `remove` must treat an already missing artifact as success.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Materialize an upload under a fresh unique key.
    ///
    /// `field` is the multipart field name and becomes the key prefix; the extension of
    /// `original_name` is preserved.
    async fn put(
        &self,
        field: &str,
        original_name: &str,
        declared_mime_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadedArtifact>;

    /// Read the full content of an artifact
    async fn read(&self, artifact: &UploadedArtifact) -> StorageResult<Vec<u8>>;

    /// Check if an artifact exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Remove an artifact.
    ///
    /// Returns `Ok(true)` when something was removed and `Ok(false)` when the artifact
    /// was already gone. Synchronous so it can run from `Drop`.
    fn remove(&self, key: &str) -> StorageResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use studymill_core::ErrorMetadata;

    #[test]
    fn test_storage_errors_surface_as_storage_failures() {
        let errors = [
            StorageError::WriteFailed("disk full".into()),
            StorageError::ReadFailed("EIO".into()),
            StorageError::DeleteFailed("EPERM".into()),
            StorageError::NotFound("studyDocument-1-0.txt".into()),
            StorageError::InvalidKey("../x".into()),
            StorageError::ConfigError("no dir".into()),
        ];

        for err in errors {
            let app_err: AppError = err.into();
            assert!(matches!(app_err, AppError::Storage(_)));
            assert_eq!(app_err.http_status_code(), 500);
            assert_eq!(app_err.client_message(), "Could not store the uploaded file.");
        }
    }
}
