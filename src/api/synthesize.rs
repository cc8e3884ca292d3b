//! Stage 3 — speech-synthesis collaborator.
//!
//! `HttpSpeechSynthesizer` posts `{"text": …}` to `{base}/tts/speak`. A
//! successful reply carries an optional `audio_base64` field; the client
//! returns it undecoded so the orchestrator owns the decode step (and its
//! error classification).

use async_trait::async_trait;
use serde::Deserialize;

use crate::api::{require_success, ApiError};
use crate::config::ApiConfig;

/// Fallback error message when a non-success response has an empty body.
const FALLBACK_MESSAGE: &str = "TTS request failed.";

/// MIME type assumed for decoded synthesis payloads.
pub const SYNTHESIS_MIME: &str = "audio/wav";

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async interface to the synthesis service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for `text`.
    ///
    /// Returns the base64-encoded payload, or `None` when the service
    /// replied successfully without one (no reply audio is rendered in that
    /// case, and it is not an error).
    async fn synthesize(&self, text: &str) -> Result<Option<String>, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpSpeechSynthesizer
// ---------------------------------------------------------------------------

/// Wire response of `POST /tts/speak`.
#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    audio_base64: Option<String>,
}

/// Production synthesis client.
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechSynthesizer {
    /// Build a client from application config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: crate::api::build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Option<String>, ApiError> {
        let url = format!("{}/tts/speak", self.base_url);
        let body = serde_json::json!({ "text": text });

        log::debug!("tts: synthesizing ({} chars)", text.len());

        let response = self.client.post(&url).json(&body).send().await?;
        let response = require_success(response, FALLBACK_MESSAGE).await?;

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body.audio_base64)
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
        assert!(HttpSpeechSynthesizer::from_config(&ApiConfig::default()).is_ok());
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn SpeechSynthesizer> =
            Box::new(HttpSpeechSynthesizer::from_config(&ApiConfig::default()).unwrap());
        drop(client);
    }

    #[test]
    fn missing_payload_deserializes_to_none() {
        let body: SynthesizeResponse = serde_json::from_str("{}").unwrap();
        assert!(body.audio_base64.is_none());

        let body: SynthesizeResponse =
            serde_json::from_str(r#"{"audio_base64":"aGVsbG8="}"#).unwrap();
        assert_eq!(body.audio_base64.as_deref(), Some("aGVsbG8="));
    }
}
