//! Voice assistant client — record or upload audio, then drive it through
//! a three-stage remote pipeline (transcription → generation → synthesis).
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐
//! │ microphone │   │ file pick  │
//! │ (audio::)  │   │ (media::)  │
//! └─────┬──────┘   └─────┬──────┘
//!       │ AudioArtifact  │
//!       ▼                ▼
//!   AppState (pipeline::state) ◀── status / error / results
//!       │
//!       ▼
//!   PipelineOrchestrator (pipeline::)
//!       │ STT ─▶ LLM ─▶ TTS   (api::, sequential, short-circuiting)
//!       ▼
//!   ResourceManager (media::resources) — preview + reply audio handles
//! ```
//!
//! One operation runs at a time: capture start/stop and both pipeline entry
//! points share a [`pipeline::BusyFlag`], and every operation's outcome lands
//! on the single [`pipeline::AppState`] status/error surface.

pub mod api;
pub mod audio;
pub mod config;
pub mod media;
pub mod pipeline;
