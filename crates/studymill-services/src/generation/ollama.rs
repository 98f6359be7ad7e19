use super::{GenerationClient, GenerationError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;
use studymill_core::Config;
use tokio::sync::Semaphore;

/// Upper bound on how much of an error body ends up in logs and error messages
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}

/// Ollama `/api/generate` client (non-streaming)
///
/// Outbound calls are bounded by a semaphore; callers beyond the limit wait for a permit.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl Debug for OllamaClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OllamaClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl OllamaClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for generation service")?;

        let max_concurrency = max_concurrency.max(1);

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            model: model.into(),
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.ollama_api_url(),
            config.ollama_model(),
            Duration::from_secs(config.generation_timeout_secs()),
            config.generation_max_concurrency(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Permits not currently held by an in-flight call
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        skip(self, prompt),
        fields(endpoint = %self.endpoint, model = %self.model, prompt_len = prompt.len())
    )]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GenerationError::Unavailable)?;

        let start = std::time::Instant::now();
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let body: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!(status = status.as_u16(), body = %body, "Generation service rejected request");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateReply = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            response_len = reply.response.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generation completed"
        );

        Ok(reply.response)
    }
}
