//! Scoped ownership of a transient artifact.

use crate::traits::{ArtifactStore, UploadedArtifact};
use std::sync::Arc;

/// Owns an uploaded artifact and removes it from the store when dropped.
///
/// Removal happens exactly once per guard, whichever way the owning request ends.
/// Removal failures are logged and never surface to the caller.
pub struct ArtifactGuard {
    store: Arc<dyn ArtifactStore>,
    artifact: Option<UploadedArtifact>,
}

impl ArtifactGuard {
    pub fn new(store: Arc<dyn ArtifactStore>, artifact: UploadedArtifact) -> Self {
        Self {
            store,
            artifact: Some(artifact),
        }
    }

    pub fn artifact(&self) -> Option<&UploadedArtifact> {
        self.artifact.as_ref()
    }

    /// Remove the artifact now. Returns whether a file was actually removed.
    pub fn release(mut self) -> bool {
        self.remove_once()
    }

    fn remove_once(&mut self) -> bool {
        let Some(artifact) = self.artifact.take() else {
            return false;
        };

        match self.store.remove(&artifact.key) {
            Ok(removed) => {
                if !removed {
                    tracing::debug!(key = %artifact.key, "Artifact already absent at cleanup");
                }
                removed
            }
            Err(e) => {
                tracing::warn!(
                    key = %artifact.key,
                    path = %artifact.path.display(),
                    error = %e,
                    "Failed to remove transient artifact"
                );
                false
            }
        }
    }
}

impl Drop for ArtifactGuard {
    // A single unlink runs inline on the worker thread; Drop cannot await.
    fn drop(&mut self) {
        self.remove_once();
    }
}

impl std::fmt::Debug for ArtifactGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactGuard")
            .field("artifact", &self.artifact)
            .finish()
    }
}
