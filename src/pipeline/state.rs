//! Status surface and shared application state.
//!
//! [`Status`] is the single user-facing operation state; its [`label`]
//! strings are what presentation renders next to the optional error message.
//!
//! [`AppState`] is the single source of truth shared between the capture
//! controller, the file intake adapter and the pipeline orchestrator: the
//! current status, the current [`AudioArtifact`], and the three stage
//! results.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>` — cheap to
//! clone and safe to share across threads.
//!
//! [`BusyFlag`] enforces the single-in-flight-operation rule: the capture
//! controller and both pipeline entry points acquire it before doing any
//! work, so shared state has exactly one writer at any instant.
//!
//! [`label`]: Status::label

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::media::AudioArtifact;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// States of the capture-and-pipeline loop, one per user-visible phase.
///
/// ```text
/// Idle ──start()──▶ Recording ──stop()──▶ Saving ──▶ Saved
///      ──select()─▶ FileReady
/// Saved / FileReady ──run──▶ Uploading ──▶ TranscriptionComplete
///                              ──full──▶ Generating ──▶ Synthesizing ──▶ Done
///                                        └─ empty ──▶ GenerationEmpty
/// any stage ──error──▶ Idle (with error message set)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing in progress; also the terminal state after any stage error.
    Idle,
    /// Microphone is live; chunks are accumulating.
    Recording,
    /// Recording stopped; chunks are being finalized into an artifact.
    Saving,
    /// A recorded artifact is ready for processing.
    Saved,
    /// An uploaded artifact is ready for processing.
    FileReady,
    /// The artifact is being sent to the transcription service.
    Uploading,
    /// Stage 1 finished; transcript available (possibly empty).
    TranscriptionComplete,
    /// Stage 2 in progress.
    Generating,
    /// Stage 2 returned empty text; the pipeline stopped without error.
    GenerationEmpty,
    /// Stage 3 in progress.
    Synthesizing,
    /// Full pipeline finished.
    Done,
}

impl Status {
    /// The user-facing label rendered by presentation.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "Idle",
            Status::Recording => "Recording...",
            Status::Saving => "Processing audio...",
            Status::Saved => "Recording saved",
            Status::FileReady => "File ready",
            Status::Uploading => "Uploading for transcription...",
            Status::TranscriptionComplete => "Transcription complete",
            Status::Generating => "Generating LLM response...",
            Status::GenerationEmpty => "LLM response empty",
            Status::Synthesizing => "Generating speech...",
            Status::Done => "Done",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Idle
    }
}

// ---------------------------------------------------------------------------
// SynthesisResult
// ---------------------------------------------------------------------------

/// Decoded stage-3 payload.
///
/// The same bytes are also registered under the reply-audio resource slot;
/// this copy lets presentation inspect the result without going through a
/// handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Decoded audio bytes.
    pub payload: Vec<u8>,
    /// MIME type of `payload`.
    pub mime: String,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth for presentation.
///
/// Held behind [`SharedState`]. The capture controller, file intake and
/// pipeline orchestrator mutate it; presentation reads snapshots.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current user-facing operation status.
    pub status: Status,

    /// Error message from the most recent failed operation.
    ///
    /// Cleared unconditionally when the next operation starts.
    pub error: Option<String>,

    /// The current input artifact, replaced wholesale by each new capture or
    /// upload. `None` until the first capture/upload or after `clear_all`.
    pub artifact: Option<AudioArtifact>,

    /// Stage-1 result. `None` if stage 1 has not run or failed.
    pub transcript: Option<String>,

    /// Stage-2 result. `Some("")` when the generator returned empty text.
    pub generation: Option<String>,

    /// Stage-3 result. `None` unless synthesis completed with a payload.
    pub synthesis: Option<SynthesisResult>,
}

impl AppState {
    /// Discard the three stage results, keeping status, error and artifact.
    ///
    /// Called whenever a fresh run is about to begin (new recording, new
    /// upload, or a pipeline invocation).
    pub fn clear_results(&mut self) {
        self.transcript = None;
        self.generation = None;
        self.synthesis = None;
    }
}

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone). Lock for a short critical section; do
/// **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] wrapping a default [`AppState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(AppState::default()))
}

// ---------------------------------------------------------------------------
// BusyFlag
// ---------------------------------------------------------------------------

/// Single-in-flight-operation guard.
///
/// The capture controller and the pipeline orchestrator share one flag; an
/// operation acquires it at entry and holds the returned [`BusyGuard`] until
/// it finishes. A second acquisition attempt while the guard is alive fails,
/// which is how overlapping operations are rejected without mutating any
/// shared state.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Create a released flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to mark an operation as in flight.
    ///
    /// Returns `None` when another operation already holds the flag.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    /// Returns `true` while an operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// RAII guard released when the in-flight operation finishes.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Status labels ---

    #[test]
    fn labels_match_presentation_strings() {
        assert_eq!(Status::Idle.label(), "Idle");
        assert_eq!(Status::Recording.label(), "Recording...");
        assert_eq!(Status::Saving.label(), "Processing audio...");
        assert_eq!(Status::Saved.label(), "Recording saved");
        assert_eq!(Status::FileReady.label(), "File ready");
        assert_eq!(Status::Uploading.label(), "Uploading for transcription...");
        assert_eq!(
            Status::TranscriptionComplete.label(),
            "Transcription complete"
        );
        assert_eq!(Status::Generating.label(), "Generating LLM response...");
        assert_eq!(Status::GenerationEmpty.label(), "LLM response empty");
        assert_eq!(Status::Synthesizing.label(), "Generating speech...");
        assert_eq!(Status::Done.label(), "Done");
    }

    #[test]
    fn default_status_is_idle() {
        assert_eq!(Status::default(), Status::Idle);
    }

    // ---- AppState ---

    #[test]
    fn default_state_is_empty_idle() {
        let state = AppState::default();
        assert_eq!(state.status, Status::Idle);
        assert!(state.error.is_none());
        assert!(state.artifact.is_none());
        assert!(state.transcript.is_none());
        assert!(state.generation.is_none());
        assert!(state.synthesis.is_none());
    }

    #[test]
    fn clear_results_keeps_status_error_and_artifact() {
        let mut state = AppState {
            status: Status::Done,
            error: Some("boom".into()),
            artifact: Some(AudioArtifact::new(vec![1], "audio/wav", None)),
            transcript: Some("hello".into()),
            generation: Some("hi".into()),
            synthesis: Some(SynthesisResult {
                payload: vec![0u8; 4],
                mime: "audio/wav".into(),
            }),
        };

        state.clear_results();

        assert!(state.transcript.is_none());
        assert!(state.generation.is_none());
        assert!(state.synthesis.is_none());
        assert_eq!(state.status, Status::Done);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(state.artifact.is_some());
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    // ---- BusyFlag ---

    #[test]
    fn busy_flag_rejects_second_acquisition() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire().expect("first acquisition");
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn busy_flag_clones_share_the_same_state() {
        let flag = BusyFlag::new();
        let clone = flag.clone();
        let _guard = flag.try_acquire().expect("acquire");
        assert!(clone.is_busy());
        assert!(clone.try_acquire().is_none());
    }
}
