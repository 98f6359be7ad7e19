//! Single-request generation pipeline.
//!
//! validate → materialize → extract → prompt → generate → persist → clean up.
//! The uploaded artifact is owned by an [`ArtifactGuard`] from the moment it is
//! materialized, so every exit path removes it exactly once.

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use studymill_core::{AppError, GeneratedMaterial, MaterialType, NewGeneratedMaterial};
use studymill_db::ResultStore;
use studymill_processing::{build_prompt, TextExtractor, UploadValidator};
use studymill_services::GenerationClient;
use studymill_storage::{ArtifactGuard, ArtifactStore};

/// Where a request is in the pipeline.
///
/// `Received → Validated → Extracted → Generated → Persisted → CleanedUp`; any stage from
/// `Validated` to `Persisted` may instead move to `Failed`, which is always followed by
/// `CleanedUp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Extracted,
    Generated,
    Persisted,
    Failed,
    CleanedUp,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Extracted => "extracted",
            PipelineStage::Generated => "generated",
            PipelineStage::Persisted => "persisted",
            PipelineStage::Failed => "failed",
            PipelineStage::CleanedUp => "cleaned_up",
        }
    }

    pub fn can_transition_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Validated, Extracted)
                | (Extracted, Generated)
                | (Generated, Persisted)
                | (Persisted, CleanedUp)
                | (Validated | Extracted | Generated | Persisted, Failed)
                | (Failed, CleanedUp)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == PipelineStage::CleanedUp
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the stage of one request and records every transition on the current span.
struct StageTracker {
    current: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: PipelineStage::Received,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal pipeline transition {} -> {}",
            self.current,
            next
        );
        tracing::Span::current().record("stage", next.as_str());
        tracing::debug!(from = %self.current, to = %next, "Pipeline stage changed");
        self.current = next;
    }
}

/// Orchestrates one generation request over injected collaborators.
#[derive(Clone)]
pub struct GenerationPipeline {
    artifacts: Arc<dyn ArtifactStore>,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn GenerationClient>,
    results: Arc<dyn ResultStore>,
    validator: UploadValidator,
}

impl GenerationPipeline {
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn GenerationClient>,
        results: Arc<dyn ResultStore>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            artifacts,
            extractor,
            generator,
            results,
            validator,
        }
    }

    pub fn results(&self) -> &Arc<dyn ResultStore> {
        &self.results
    }

    /// Admission check on the declared type and name. Runs before anything is stored.
    pub fn validate_upload(&self, filename: &str, content_type: &str) -> Result<(), AppError> {
        self.validator.validate(filename, content_type)?;
        Ok(())
    }

    /// Store an admitted upload and hand back the guard that owns it.
    pub async fn materialize(
        &self,
        field: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<ArtifactGuard, AppError> {
        let artifact = self
            .artifacts
            .put(field, filename, content_type, data)
            .await?;

        tracing::debug!(
            key = %artifact.key,
            original_name = %artifact.original_name,
            size_bytes = artifact.size,
            "Upload materialized"
        );

        Ok(ArtifactGuard::new(self.artifacts.clone(), artifact))
    }

    /// Run the rest of the pipeline for a materialized upload.
    ///
    /// The guard is consumed: the artifact is removed before this returns, whatever the
    /// outcome.
    #[tracing::instrument(
        skip_all,
        fields(material_type = %material_type, stage = tracing::field::Empty)
    )]
    pub async fn run(
        &self,
        upload: ArtifactGuard,
        material_type: MaterialType,
    ) -> Result<GeneratedMaterial, AppError> {
        let mut stage = StageTracker::new();
        stage.advance(PipelineStage::Validated);

        let outcome = self.process(&upload, material_type, &mut stage).await;

        if let Err(e) = &outcome {
            tracing::warn!(
                failed_at = %stage.current,
                error_type = e.error_type(),
                "Generation pipeline failed"
            );
            stage.advance(PipelineStage::Failed);
        }

        let removed = upload.release();
        stage.advance(PipelineStage::CleanedUp);
        tracing::debug!(artifact_removed = removed, "Request artifacts cleaned up");

        outcome
    }

    async fn process(
        &self,
        upload: &ArtifactGuard,
        material_type: MaterialType,
        stage: &mut StageTracker,
    ) -> Result<GeneratedMaterial, AppError> {
        let artifact = upload
            .artifact()
            .ok_or_else(|| AppError::Internal("Upload was released before processing".into()))?;

        let data = self.artifacts.read(artifact).await?;
        let kind = self
            .validator
            .classify(&artifact.original_name, &artifact.declared_mime_type, &data);

        let source_text = self.extractor.extract(kind, &data).await?;
        stage.advance(PipelineStage::Extracted);

        if source_text.trim().is_empty() {
            tracing::warn!(key = %artifact.key, kind = %kind, "Extracted text is empty");
        }

        let prompt = build_prompt(material_type, &source_text);
        let completion = self.generator.generate(&prompt).await?;
        stage.advance(PipelineStage::Generated);

        let saved = self
            .results
            .insert(NewGeneratedMaterial {
                filename: artifact.filename().to_string(),
                material_type,
                generated_content: completion,
            })
            .await?;
        stage.advance(PipelineStage::Persisted);

        tracing::info!(
            material_id = %saved.id,
            model = %self.generator.model(),
            "Study material generated"
        );

        Ok(saved)
    }
}
