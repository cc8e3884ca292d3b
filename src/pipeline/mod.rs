//! Shared state and the remote-call pipeline.
//!
//! [`state`] holds the status surface, the shared [`AppState`] and the
//! [`BusyFlag`] that serializes operations; [`orchestrator`] drives the
//! STT → LLM → TTS chain over the current artifact.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{PipelineError, PipelineOrchestrator, Stage};
pub use state::{
    new_shared_state, AppState, BusyFlag, BusyGuard, SharedState, Status, SynthesisResult,
};
