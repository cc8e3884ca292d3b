//! Stage 1 — speech-to-text collaborator.
//!
//! `HttpSpeechToText` posts the artifact as a multipart form to
//! `{base}/stt/transcribe` and returns the `text` field of the JSON
//! response (empty string when absent).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::api::{require_success, ApiError};
use crate::config::ApiConfig;
use crate::media::AudioArtifact;

/// Fallback error message when a non-success response has an empty body.
const FALLBACK_MESSAGE: &str = "STT request failed.";

// ---------------------------------------------------------------------------
// SpeechToText trait
// ---------------------------------------------------------------------------

/// Async interface to the transcription service.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SpeechToText>` across the orchestrator and tests.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe `artifact`, returning the recognized text.
    ///
    /// An absent `text` field in a successful response is returned as an
    /// empty string, never an error.
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpSpeechToText
// ---------------------------------------------------------------------------

/// Wire response of `POST /stt/transcribe`.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: String,
}

/// Production transcription client.
pub struct HttpSpeechToText {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechToText {
    /// Build a client from application config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: crate::api::build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String, ApiError> {
        let part = Part::bytes(artifact.data().to_vec())
            .file_name(artifact.filename().to_string())
            .mime_str(artifact.mime())
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = format!("{}/stt/transcribe", self.base_url);
        log::debug!(
            "stt: uploading {} bytes ({}) to {url}",
            artifact.len(),
            artifact.mime()
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = require_success(response, FALLBACK_MESSAGE).await?;

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_with_defaults() {
        let config = ApiConfig::default();
        assert!(HttpSpeechToText::from_config(&config).is_ok());
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn SpeechToText> =
            Box::new(HttpSpeechToText::from_config(&ApiConfig::default()).unwrap());
        drop(client);
    }

    #[test]
    fn response_text_defaults_to_empty() {
        let body: TranscribeResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.text, "");

        let body: TranscribeResponse =
            serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(body.text, "hello");
    }
}
