use super::ExtractionError;
use crate::validator::DocumentKind;

/// Extract text from PDF bytes using pdf-extract on a blocking thread.
pub(super) async fn extract_text(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    // pdf-extract can panic on hostile input; a panicked task surfaces as a JoinError
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| malformed(format!("PDF parser aborted: {}", e)))?
        .map_err(|e| malformed(e.to_string()))
}

fn malformed(reason: String) -> ExtractionError {
    ExtractionError::Malformed {
        kind: DocumentKind::Pdf,
        reason,
    }
}
