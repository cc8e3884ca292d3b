//! [`AudioArtifact`] — one finalized audio payload, recorded or uploaded.
//!
//! An artifact is immutable once created: a new capture or upload replaces
//! the current artifact wholesale, it is never mutated in place.

// ---------------------------------------------------------------------------
// AudioArtifact
// ---------------------------------------------------------------------------

/// A finalized, immutable binary audio payload ready for transmission.
///
/// Created by the capture controller (on stop) or the file intake adapter
/// (on selection). Cloning is a deep copy; artifacts are small enough that
/// this is acceptable for the single-clip workflows this crate supports.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    data: Vec<u8>,
    mime: String,
    filename: Option<String>,
}

impl AudioArtifact {
    /// Default filename used when an artifact carries none (recorded clips).
    pub const DEFAULT_FILENAME: &'static str = "recording.wav";

    /// Wrap raw bytes as an artifact.
    pub fn new(data: Vec<u8>, mime: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
            filename,
        }
    }

    /// The binary payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME type of the payload (e.g. `audio/wav`).
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Filename to use when transmitting the payload.
    ///
    /// Uploaded files keep their original name; recorded clips fall back to
    /// [`Self::DEFAULT_FILENAME`].
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(Self::DEFAULT_FILENAME)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
