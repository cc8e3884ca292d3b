//! Pipeline orchestrator — drives the artifact → STT → LLM → TTS chain.
//!
//! # Pipeline flow
//!
//! ```text
//! run_transcription_only()
//!   └─▶ require artifact → POST /stt/transcribe → Transcript
//!
//! run_full_pipeline()
//!   └─▶ stage 1 as above
//!         ├─ empty transcript → stop (no error)
//!         └─▶ POST /llm/generate                  [Generating]
//!               ├─ empty response → stop (no error, "LLM response empty")
//!               └─▶ POST /tts/speak               [Synthesizing]
//!                     ├─ no payload → Done (no reply audio)
//!                     └─ base64 payload → decode → reply-audio slot → Done
//! ```
//!
//! Stages run strictly sequentially; a stage is only issued after the
//! previous response resolved. Any stage failure aborts the chain, surfaces
//! the service's error body (or a stage default) and resets the status to
//! idle. There is no retry and no cancellation of an in-flight call; the
//! shared [`BusyFlag`] rejects overlapping invocations instead.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose;
use base64::Engine as _;
use thiserror::Error;

use crate::api::synthesize::SYNTHESIS_MIME;
use crate::api::{ApiError, SpeechSynthesizer, SpeechToText, TextGenerator};
use crate::media::{AudioArtifact, ResourceSlot, SharedResources};
use crate::pipeline::state::{BusyFlag, SharedState, Status, SynthesisResult};

// ---------------------------------------------------------------------------
// Stage / PipelineError
// ---------------------------------------------------------------------------

/// One of the three sequential remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Generate,
    Synthesize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Transcribe => "transcribe",
            Stage::Generate => "generate",
            Stage::Synthesize => "synthesize",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the pipeline entry points.
///
/// The `Display` text of every variant is exactly what presentation shows,
/// so stage errors render the service's message verbatim.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No current artifact; no network call was made.
    #[error("Please record or upload audio first.")]
    MissingInput,

    /// Another operation is already in flight; nothing was mutated.
    #[error("Another operation is already in progress.")]
    Busy,

    /// A remote stage failed; the remaining stages were not run.
    #[error("{message}")]
    Stage { stage: Stage, message: String },
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Runs the ordered remote-call chain over the current artifact.
///
/// Shareable across tasks (`Arc<PipelineOrchestrator>`); the [`BusyFlag`]
/// guarantees a single in-flight operation, so the shared state has one
/// writer at any instant.
pub struct PipelineOrchestrator {
    shared: SharedState,
    resources: SharedResources,
    stt: Arc<dyn SpeechToText>,
    llm: Arc<dyn TextGenerator>,
    tts: Arc<dyn SpeechSynthesizer>,
    busy: BusyFlag,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// `busy` must be the same flag handed to the capture controller so
    /// capture and pipeline operations exclude each other.
    pub fn new(
        shared: SharedState,
        resources: SharedResources,
        stt: Arc<dyn SpeechToText>,
        llm: Arc<dyn TextGenerator>,
        tts: Arc<dyn SpeechSynthesizer>,
        busy: BusyFlag,
    ) -> Self {
        Self {
            shared,
            resources,
            stt,
            llm,
            tts,
            busy,
        }
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Run stage 1 only: upload the current artifact for transcription.
    pub async fn run_transcription_only(&self) -> Result<(), PipelineError> {
        let _guard = self.busy.try_acquire().ok_or(PipelineError::Busy)?;
        self.transcribe_stage().await.map(|_| ())
    }

    /// Run the full three-stage chain, with the short-circuit rules:
    /// an empty transcript or empty generation stops the chain without an
    /// error; any stage failure aborts with the error surfaced.
    pub async fn run_full_pipeline(&self) -> Result<(), PipelineError> {
        let _guard = self.busy.try_acquire().ok_or(PipelineError::Busy)?;

        // ── Stage 1: transcription ───────────────────────────────────────
        let transcript = self.transcribe_stage().await?;
        if transcript.is_empty() {
            log::info!("pipeline: empty transcript, stopping after stage 1");
            return Ok(());
        }

        // ── Stage 2: generation ──────────────────────────────────────────
        self.set_status(Status::Generating);
        let generation = match self.llm.generate(&transcript).await {
            Ok(text) => text,
            Err(e) => return Err(self.fail(Stage::Generate, e)),
        };
        self.shared.lock().unwrap().generation = Some(generation.clone());

        if generation.is_empty() {
            log::info!("pipeline: empty generation, stopping after stage 2");
            self.set_status(Status::GenerationEmpty);
            return Ok(());
        }

        // ── Stage 3: synthesis ───────────────────────────────────────────
        self.set_status(Status::Synthesizing);
        let encoded = match self.tts.synthesize(&generation).await {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(Stage::Synthesize, e)),
        };

        match encoded {
            Some(encoded) => {
                let payload = match general_purpose::STANDARD.decode(encoded.as_bytes()) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        return Err(self.fail_with(
                            Stage::Synthesize,
                            format!("Failed to decode synthesized audio: {e}"),
                        ))
                    }
                };

                self.resources.lock().unwrap().register(
                    ResourceSlot::ReplyAudio,
                    payload.clone(),
                    SYNTHESIS_MIME,
                );
                self.shared.lock().unwrap().synthesis = Some(SynthesisResult {
                    payload,
                    mime: SYNTHESIS_MIME.into(),
                });
            }
            None => {
                // Successful reply without audio: complete silently.
                log::debug!("pipeline: synthesis returned no payload");
            }
        }

        self.set_status(Status::Done);
        Ok(())
    }

    /// Discard everything: every resource slot, the current artifact, all
    /// stage results, the error, and reset the status to idle.
    pub fn clear_all(&self) {
        self.resources.lock().unwrap().dispose_all();

        let mut st = self.shared.lock().unwrap();
        st.artifact = None;
        st.clear_results();
        st.status = Status::Idle;
        st.error = None;
        log::info!("pipeline: cleared all state");
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Stage 1: require an artifact, clear prior results, upload, store the
    /// transcript. Returns the transcript text for chaining.
    async fn transcribe_stage(&self) -> Result<String, PipelineError> {
        // Starting a new operation clears the previous error before any
        // work. The artifact requirement is checked before anything else is
        // touched — no result clearing and no network call on a miss.
        let artifact: AudioArtifact = {
            let mut st = self.shared.lock().unwrap();
            st.error = None;
            match st.artifact.clone() {
                Some(artifact) => artifact,
                None => {
                    st.error = Some(PipelineError::MissingInput.to_string());
                    return Err(PipelineError::MissingInput);
                }
            }
        };

        {
            let mut st = self.shared.lock().unwrap();
            st.clear_results();
            st.status = Status::Uploading;
        }
        // A cleared synthesis result must not leave a stale reply handle.
        self.resources.lock().unwrap().dispose(ResourceSlot::ReplyAudio);

        match self.stt.transcribe(&artifact).await {
            Ok(text) => {
                let mut st = self.shared.lock().unwrap();
                st.transcript = Some(text.clone());
                st.status = Status::TranscriptionComplete;
                Ok(text)
            }
            Err(e) => Err(self.fail(Stage::Transcribe, e)),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_status(&self, status: Status) {
        self.shared.lock().unwrap().status = status;
    }

    /// Record a stage failure: status back to idle, error message surfaced.
    fn fail(&self, stage: Stage, error: ApiError) -> PipelineError {
        self.fail_with(stage, error.to_string())
    }

    fn fail_with(&self, stage: Stage, message: String) -> PipelineError {
        log::error!("pipeline: {stage} stage failed: {message}");
        let mut st = self.shared.lock().unwrap();
        st.status = Status::Idle;
        st.error = Some(message.clone());
        PipelineError::Stage { stage, message }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
