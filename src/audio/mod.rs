//! Audio capture — microphone stream → chunk buffer → WAV artifact.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → MediaCaptureSession
//!           → encode_wav → AudioArtifact (audio/wav)
//! ```
//!
//! [`CaptureController`] drives the state machine; [`AudioCapture`] wraps
//! the cpal device; [`encode_wav`] produces the playable container.

pub mod capture;
pub mod recorder;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use recorder::{
    CaptureController, CaptureSource, CaptureState, MicCaptureSource, OpenSession,
    SessionParams, StreamGuard, PERMISSION_DENIED_MESSAGE,
};
pub use wav::{encode_wav, WAV_MIME};
