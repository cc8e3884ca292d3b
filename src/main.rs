//! Application entry point — voice assistant CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run) and apply
//!    environment overrides.
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the three remote stage clients from config.
//! 5. Acquire an input artifact: the file named on the command line, or a
//!    microphone take (Enter stops the recording).
//! 6. Run the full pipeline and print the stage results; the synthesized
//!    reply, if any, is written next to the working directory.

use std::io::BufRead;
use std::sync::Arc;

use voice_assistant::{
    api::{HttpSpeechSynthesizer, HttpSpeechToText, HttpTextGenerator},
    audio::{CaptureController, MicCaptureSource},
    config::AppConfig,
    media::{new_shared_resources, FileIntake, ResourceSlot},
    pipeline::{new_shared_state, BusyFlag, PipelineOrchestrator},
};

/// Where the synthesized reply is written after a successful full run.
const REPLY_FILE: &str = "reply.wav";

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice assistant starting up");

    // 2. Configuration
    let config = AppConfig::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        })
        .with_env_overrides();
    log::info!("remote base address: {}", config.api.base_url);

    // 3. Tokio runtime (2 worker threads — the pipeline stages run serially,
    //    one extra worker covers logging/IO)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 4. Shared state + remote stage clients
    let shared = new_shared_state();
    let resources = new_shared_resources();
    let busy = BusyFlag::new();

    let orchestrator = PipelineOrchestrator::new(
        Arc::clone(&shared),
        Arc::clone(&resources),
        Arc::new(HttpSpeechToText::from_config(&config.api)?),
        Arc::new(HttpTextGenerator::from_config(&config.api)?),
        Arc::new(HttpSpeechSynthesizer::from_config(&config.api)?),
        busy.clone(),
    );

    // 5. Input artifact: file argument, or a live microphone take
    match std::env::args().nth(1) {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            let filename = std::path::Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.clone());
            let intake = FileIntake::new(Arc::clone(&shared), Arc::clone(&resources));
            intake.select(bytes, mime_for(&filename), filename);
        }
        None => {
            let mut controller = CaptureController::new(
                Box::new(MicCaptureSource::new(config.audio.device.clone())),
                Arc::clone(&shared),
                Arc::clone(&resources),
                busy.clone(),
            );

            controller.start()?;
            println!("Recording... press Enter to stop.");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            controller.stop()?;
        }
    }

    // 6. Run the pipeline and report
    let outcome = rt.block_on(orchestrator.run_full_pipeline());

    let st = shared.lock().unwrap();
    println!("Status: {}", st.status.label());
    if let Some(error) = &st.error {
        println!("Error: {error}");
    }
    if let Some(transcript) = &st.transcript {
        println!("Transcript: {transcript}");
    }
    if let Some(generation) = &st.generation {
        println!("Response: {generation}");
    }
    drop(st);

    if outcome.is_ok() {
        if let Some(handle) = resources.lock().unwrap().get(ResourceSlot::ReplyAudio) {
            match handle.bytes() {
                Ok(bytes) => {
                    std::fs::write(REPLY_FILE, bytes)?;
                    println!("Reply audio written to {REPLY_FILE}");
                }
                Err(e) => log::warn!("reply audio handle unavailable: {e}"),
            }
        }
    }

    outcome?;
    Ok(())
}

/// Best-effort MIME guess for uploaded files; the services only care that
/// audio decodes, so unknown extensions fall back to a generic type.
fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_for_known_extensions() {
        assert_eq!(mime_for("clip.wav"), "audio/wav");
        assert_eq!(mime_for("clip.mp3"), "audio/mpeg");
        assert_eq!(mime_for("clip.flac"), "audio/flac");
    }

    #[test]
    fn mime_for_is_case_insensitive() {
        assert_eq!(mime_for("clip.WAV"), "audio/wav");
        assert_eq!(mime_for("CLIP.Mp3"), "audio/mpeg");
    }

    #[test]
    fn mime_for_unknown_falls_back_to_octet_stream() {
        assert_eq!(mime_for("notes.txt"), "application/octet-stream");
        assert_eq!(mime_for("no_extension"), "application/octet-stream");
    }
}
