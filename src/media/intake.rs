//! File intake adapter — accepts an externally supplied file as the current
//! artifact, bypassing capture.
//!
//! No content validation happens here: a non-audio payload is accepted and
//! its format error surfaces later from the remote transcription stage.

use crate::media::{AudioArtifact, ResourceSlot, SharedResources};
use crate::pipeline::{SharedState, Status};

// ---------------------------------------------------------------------------
// FileIntake
// ---------------------------------------------------------------------------

/// Wraps uploaded files as artifacts and installs them as the current input.
pub struct FileIntake {
    shared: SharedState,
    resources: SharedResources,
}

impl FileIntake {
    /// Create an intake adapter over the shared state and resource slots.
    pub fn new(shared: SharedState, resources: SharedResources) -> Self {
        Self { shared, resources }
    }

    /// Accept `bytes` as the current [`AudioArtifact`], unconditionally.
    ///
    /// Clears the prior pipeline results, registers the input-preview
    /// handle, and sets the status to "File ready". An active capture
    /// session is not stopped — that remains the caller's responsibility.
    pub fn select(
        &self,
        bytes: Vec<u8>,
        mime: impl Into<String>,
        filename: impl Into<String>,
    ) -> AudioArtifact {
        let artifact = AudioArtifact::new(bytes, mime, Some(filename.into()));
        log::info!(
            "intake: selected '{}' ({} bytes, {})",
            artifact.filename(),
            artifact.len(),
            artifact.mime()
        );

        self.resources.lock().unwrap().register(
            ResourceSlot::InputPreview,
            artifact.data().to_vec(),
            artifact.mime(),
        );

        let mut st = self.shared.lock().unwrap();
        st.clear_results();
        st.artifact = Some(artifact.clone());
        st.status = Status::FileReady;
        artifact
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::media::new_shared_resources;
    use crate::pipeline::{new_shared_state, SynthesisResult};

    fn make_intake() -> (FileIntake, SharedState, SharedResources) {
        let shared = new_shared_state();
        let resources = new_shared_resources();
        let intake = FileIntake::new(Arc::clone(&shared), Arc::clone(&resources));
        (intake, shared, resources)
    }

    #[test]
    fn select_installs_artifact_and_preview_handle() {
        let (intake, shared, resources) = make_intake();

        let artifact = intake.select(vec![1, 2, 3], "audio/mpeg", "clip.mp3");
        assert_eq!(artifact.filename(), "clip.mp3");

        let st = shared.lock().unwrap();
        assert_eq!(st.status, Status::FileReady);
        assert_eq!(st.artifact.as_ref(), Some(&artifact));

        let handle = resources
            .lock()
            .unwrap()
            .get(ResourceSlot::InputPreview)
            .expect("preview handle");
        assert_eq!(handle.bytes().unwrap(), &[1, 2, 3]);
        assert_eq!(handle.mime(), "audio/mpeg");
    }

    #[test]
    fn select_clears_prior_results() {
        let (intake, shared, _resources) = make_intake();

        {
            let mut st = shared.lock().unwrap();
            st.transcript = Some("old".into());
            st.generation = Some("old".into());
            st.synthesis = Some(SynthesisResult {
                payload: vec![9],
                mime: "audio/wav".into(),
            });
        }

        intake.select(vec![0], "audio/wav", "next.wav");

        let st = shared.lock().unwrap();
        assert!(st.transcript.is_none());
        assert!(st.generation.is_none());
        assert!(st.synthesis.is_none());
    }

    #[test]
    fn select_replaces_previous_preview_handle() {
        let (intake, _shared, resources) = make_intake();

        intake.select(vec![1], "audio/wav", "a.wav");
        let first = resources
            .lock()
            .unwrap()
            .get(ResourceSlot::InputPreview)
            .unwrap();

        intake.select(vec![2], "audio/wav", "b.wav");
        assert!(!first.is_valid());
    }

    #[test]
    fn select_accepts_any_payload_unconditionally() {
        let (intake, shared, _resources) = make_intake();
        // Not audio at all — still accepted; the STT stage will complain.
        let artifact = intake.select(b"not audio".to_vec(), "text/plain", "notes.txt");
        assert_eq!(artifact.mime(), "text/plain");
        assert_eq!(shared.lock().unwrap().status, Status::FileReady);
    }
}
