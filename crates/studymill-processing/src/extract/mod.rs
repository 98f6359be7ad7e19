//! Text extraction
//!
//! Turns the bytes of an admitted upload into plain text. The strategy is picked by
//! [`DocumentKind`]; failures are terminal for the request and never retried.

mod docx;
mod pdf;
mod text;

use crate::validator::DocumentKind;
use async_trait::async_trait;
use studymill_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Malformed {kind} document: {reason}")]
    Malformed { kind: DocumentKind, reason: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(DocumentKind),

    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err.to_string())
    }
}

/// Extracts plain text from a document
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, kind: DocumentKind, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Default extractor covering every [`DocumentKind`] this service admits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    #[tracing::instrument(skip(self, data), fields(kind = %kind, size_bytes = data.len()))]
    async fn extract(&self, kind: DocumentKind, data: &[u8]) -> Result<String, ExtractionError> {
        let start = std::time::Instant::now();

        let text = match kind {
            DocumentKind::Pdf => pdf::extract_text(data.to_vec()).await?,
            DocumentKind::Docx => docx::extract_text(data.to_vec()).await?,
            DocumentKind::PlainText => text::extract_text(data),
            DocumentKind::LegacyDoc => return Err(ExtractionError::UnsupportedFormat(kind)),
        };

        tracing::debug!(
            chars = text.chars().count(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Text extracted"
        );

        Ok(text)
    }
}
