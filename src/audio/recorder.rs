//! Live-microphone capture controller.
//!
//! [`CaptureController`] drives the capture state machine:
//!
//! ```text
//! Idle ──start()──▶ RequestingPermission ──grant──▶ Recording
//!                      └──deny──▶ Idle (error set)
//! Recording ──stop()──▶ Stopping ──▶ Ready (artifact finalized)
//! Ready ──start()──▶ RequestingPermission (next take)
//! ```
//!
//! While `Recording`, chunks accumulate in arrival order on the session's
//! channel. `stop()` releases the hardware, concatenates the chunks, encodes
//! them as a WAV [`AudioArtifact`], registers the input-preview resource
//! handle and stores the artifact in shared state.
//!
//! The hardware seam is the [`CaptureSource`] trait so the state machine is
//! testable without a microphone; [`MicCaptureSource`] is the production
//! implementation over [`AudioCapture`].

use std::sync::mpsc;

use crate::audio::capture::{AudioCapture, AudioChunk, CaptureError};
use crate::audio::wav::{encode_wav, WAV_MIME};
use crate::media::{AudioArtifact, ResourceSlot, SharedResources};
use crate::pipeline::{BusyFlag, SharedState, Status};

/// Fixed user-facing message for permission denial / unavailable hardware.
pub const PERMISSION_DENIED_MESSAGE: &str = "Microphone permission denied or unavailable.";

// ---------------------------------------------------------------------------
// CaptureState
// ---------------------------------------------------------------------------

/// States of the live-capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture activity; `start()` is valid.
    Idle,
    /// Waiting for the hardware/permission grant.
    RequestingPermission,
    /// A session is live; chunks are buffering.
    Recording,
    /// `stop()` in progress; chunks are being finalized.
    Stopping,
    /// A finalized artifact exists; `start()` is valid again.
    Ready,
}

impl CaptureState {
    /// Returns `true` in the states from which `start()` may be called.
    pub fn can_start(&self) -> bool {
        matches!(self, CaptureState::Idle | CaptureState::Ready)
    }
}

// ---------------------------------------------------------------------------
// CaptureSource seam
// ---------------------------------------------------------------------------

/// RAII over a live hardware stream; dropping it releases every track.
pub trait StreamGuard {}

impl StreamGuard for crate::audio::capture::StreamHandle {}

/// Negotiated parameters of an open capture session.
#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    /// Sample rate of the delivered chunks in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels per chunk.
    pub channels: u16,
}

/// An open session as returned by a [`CaptureSource`].
pub struct OpenSession {
    /// Negotiated stream parameters.
    pub params: SessionParams,
    /// Keeps the hardware stream alive until dropped.
    pub guard: Box<dyn StreamGuard>,
}

/// Seam over the audio hardware. Opening a session is the permission
/// request: an `Err` is a denial, an `Ok` is a grant with a live stream
/// delivering chunks to the supplied channel.
pub trait CaptureSource {
    /// Request exclusive access to the input device and start delivering
    /// chunks to `tx`.
    fn open(&self, tx: mpsc::Sender<AudioChunk>) -> Result<OpenSession, CaptureError>;
}

/// Production source backed by the system microphone.
pub struct MicCaptureSource {
    device: Option<String>,
}

impl MicCaptureSource {
    /// Create a source for the named device, or the system default when
    /// `device` is `None`.
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }
}

impl CaptureSource for MicCaptureSource {
    fn open(&self, tx: mpsc::Sender<AudioChunk>) -> Result<OpenSession, CaptureError> {
        let capture = AudioCapture::new(self.device.as_deref())?;
        let params = SessionParams {
            sample_rate: capture.sample_rate(),
            channels: capture.channels(),
        };
        let handle = capture.start(tx)?;
        log::info!(
            "capture: session open ({} Hz, {} ch)",
            params.sample_rate,
            params.channels
        );
        Ok(OpenSession {
            params,
            guard: Box::new(handle),
        })
    }
}

// ---------------------------------------------------------------------------
// MediaCaptureSession
// ---------------------------------------------------------------------------

/// A live hardware capture in progress.
///
/// Exactly one may exist at a time; it never outlives the controller's
/// `Recording` state. Dropping (or finishing) the session releases the
/// hardware stream.
struct MediaCaptureSession {
    chunks: mpsc::Receiver<AudioChunk>,
    params: SessionParams,
    guard: Box<dyn StreamGuard>,
}

impl MediaCaptureSession {
    /// Release the hardware, drain the buffered chunks in arrival order and
    /// encode them into a WAV artifact.
    fn finish(self) -> Result<AudioArtifact, CaptureError> {
        // Stop the stream first so no further chunks are produced while we
        // drain the ones already queued.
        drop(self.guard);

        let mut samples: Vec<f32> = Vec::new();
        while let Ok(chunk) = self.chunks.try_recv() {
            samples.extend_from_slice(&chunk.samples);
        }

        log::debug!(
            "capture: finalizing {} samples @ {} Hz",
            samples.len(),
            self.params.sample_rate
        );

        let bytes = encode_wav(&samples, self.params.sample_rate, self.params.channels)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        Ok(AudioArtifact::new(bytes, WAV_MIME, None))
    }
}

// ---------------------------------------------------------------------------
// CaptureController
// ---------------------------------------------------------------------------

/// Owns the capture state machine and the (at most one) live session.
///
/// Not `Send`: the controller lives on the thread that owns the hardware
/// stream, like the UI thread it serves.
pub struct CaptureController {
    source: Box<dyn CaptureSource>,
    state: CaptureState,
    session: Option<MediaCaptureSession>,
    shared: SharedState,
    resources: SharedResources,
    busy: BusyFlag,
}

impl CaptureController {
    /// Create a controller in `Idle` with no session.
    pub fn new(
        source: Box<dyn CaptureSource>,
        shared: SharedState,
        resources: SharedResources,
        busy: BusyFlag,
    ) -> Self {
        Self {
            source,
            state: CaptureState::Idle,
            session: None,
            shared,
            resources,
            busy,
        }
    }

    /// Current state of the capture machine.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Begin a new recording.
    ///
    /// Valid only from `Idle` or `Ready`, and only while no pipeline
    /// operation is in flight. On permission denial the controller returns
    /// to `Idle` with a fixed user-facing error; any prior artifact is left
    /// untouched. On grant it enters `Recording` and clears the three
    /// pipeline result entities.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if !self.state.can_start() {
            return Err(CaptureError::AlreadyActive);
        }
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(CaptureError::Busy);
        };

        // New operation: the previous error is cleared before any work.
        self.shared.lock().unwrap().error = None;

        self.state = CaptureState::RequestingPermission;
        let (tx, rx) = mpsc::channel();

        match self.source.open(tx) {
            Ok(open) => {
                self.session = Some(MediaCaptureSession {
                    chunks: rx,
                    params: open.params,
                    guard: open.guard,
                });
                self.state = CaptureState::Recording;

                let mut st = self.shared.lock().unwrap();
                st.clear_results();
                st.status = Status::Recording;
                Ok(())
            }
            Err(e) => {
                log::warn!("capture: permission denied or device unavailable: {e}");
                self.state = CaptureState::Idle;

                let mut st = self.shared.lock().unwrap();
                st.error = Some(PERMISSION_DENIED_MESSAGE.to_string());
                st.status = Status::Idle;
                Err(e)
            }
        }
    }

    /// Stop the current recording and finalize the artifact.
    ///
    /// A no-op when not `Recording`: returns `Ok(None)` without touching the
    /// status or any artifact. Rejected with [`CaptureError::Busy`] while a
    /// pipeline run is in flight — finalization mutates the status, the
    /// artifact and the preview slot, so it must not race an active run.
    /// Otherwise releases the hardware, encodes the buffered chunks,
    /// registers the input-preview handle, stores the artifact and enters
    /// `Ready`.
    pub fn stop(&mut self) -> Result<Option<AudioArtifact>, CaptureError> {
        if self.state != CaptureState::Recording {
            return Ok(None);
        }
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(CaptureError::Busy);
        };

        self.state = CaptureState::Stopping;
        self.shared.lock().unwrap().status = Status::Saving;

        // Recording implies a live session; a missing one means the machine
        // was corrupted externally, so fall back to Idle.
        let Some(session) = self.session.take() else {
            self.state = CaptureState::Idle;
            return Ok(None);
        };

        let artifact = match session.finish() {
            Ok(artifact) => artifact,
            Err(e) => {
                self.state = CaptureState::Idle;
                let mut st = self.shared.lock().unwrap();
                st.error = Some(e.to_string());
                st.status = Status::Idle;
                return Err(e);
            }
        };

        self.resources.lock().unwrap().register(
            ResourceSlot::InputPreview,
            artifact.data().to_vec(),
            artifact.mime(),
        );

        let mut st = self.shared.lock().unwrap();
        st.artifact = Some(artifact.clone());
        st.status = Status::Saved;
        drop(st);

        self.state = CaptureState::Ready;
        log::info!("capture: recording saved ({} bytes)", artifact.len());
        Ok(Some(artifact))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
