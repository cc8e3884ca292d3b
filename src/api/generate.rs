//! Stage 2 — language-model generation collaborator.
//!
//! `HttpTextGenerator` posts `{"prompt": …}` to `{base}/llm/generate` and
//! returns the `response` field of the JSON reply (empty string when
//! absent).

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{require_success, ApiError};
use crate::config::ApiConfig;

/// Fallback error message when a non-success response has an empty body.
const FALLBACK_MESSAGE: &str = "LLM request failed.";

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Async interface to the generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for `prompt`.
    ///
    /// An absent `response` field in a successful reply is returned as an
    /// empty string — the orchestrator treats that as a soft-empty outcome,
    /// not an error.
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpTextGenerator
// ---------------------------------------------------------------------------

/// Wire response of `POST /llm/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Production generation client.
pub struct HttpTextGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTextGenerator {
    /// Build a client from application config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: crate::api::build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!("{}/llm/generate", self.base_url);
        let body = serde_json::json!({ "prompt": prompt });

        log::debug!("llm: prompting ({} chars)", prompt.len());

        let response = self.client.post(&url).json(&body).send().await?;
        let response = require_success(response, FALLBACK_MESSAGE).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body.response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
