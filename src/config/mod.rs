//! Configuration module for the voice assistant client.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the remote
//! collaborators and microphone capture, `AppPaths` for cross-platform
//! config directories, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{ApiConfig, AppConfig, AudioConfig, API_BASE_ENV, DEFAULT_API_BASE};
