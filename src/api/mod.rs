//! Remote collaborator clients for the three pipeline stages.
//!
//! This module provides:
//! * [`SpeechToText`] / [`HttpSpeechToText`] — multipart audio upload to the
//!   transcription service.
//! * [`TextGenerator`] / [`HttpTextGenerator`] — prompt/response exchange
//!   with the generation service.
//! * [`SpeechSynthesizer`] / [`HttpSpeechSynthesizer`] — text-to-speech
//!   returning an optional base64 payload.
//! * [`ApiError`] — error variants shared by all three clients.
//!
//! All three collaborators live under one base address (default
//! `http://localhost:8000`) and share the same non-success contract: the
//! response body is read as plain text and used verbatim as the error
//! message, with a stage-specific fallback when the body is empty.

pub mod generate;
pub mod synthesize;
pub mod transcribe;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use generate::{HttpTextGenerator, TextGenerator};
pub use synthesize::{HttpSpeechSynthesizer, SpeechSynthesizer};
pub use transcribe::{HttpSpeechToText, SpeechToText};

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors that can occur while calling a remote collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The service returned a non-success status.
    ///
    /// `message` is the response body, or a stage-specific fallback when the
    /// body was empty. Displayed verbatim to the user.
    #[error("{message}")]
    Status { message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Non-success handling
// ---------------------------------------------------------------------------

/// Pass a successful response through; turn a non-success response into
/// [`ApiError::Status`] whose message is the body text, or `fallback` when
/// the body is empty or unreadable.
pub(crate) async fn require_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        fallback.to_string()
    } else {
        body
    };
    log::warn!("api: non-success response ({status}): {message}");
    Err(ApiError::Status { message })
}

/// Build a `reqwest::Client` with the per-request timeout from config.
///
/// Construction happens once at startup, so a builder failure (broken TLS
/// backend, exhausted resources) surfaces there instead of on first use.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ApiError::Request(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
