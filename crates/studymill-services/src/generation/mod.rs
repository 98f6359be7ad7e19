//! Text-generation provider abstraction.

mod ollama;

use async_trait::async_trait;
use std::time::Duration;
use studymill_core::AppError;

pub use ollama::OllamaClient;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to reach generation service: {0}")]
    Transport(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("Generation client is shut down")]
    Unavailable,
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Generation(err.to_string())
    }
}

/// Completion provider. One prompt in, one full completion out; never retried.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Model name sent with every request (e.g. "mistral")
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
