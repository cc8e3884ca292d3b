//! Media artifacts and their ephemeral resource handles.
//!
//! This module provides:
//! * [`AudioArtifact`] — one finalized audio payload.
//! * [`FileIntake`] — the upload path for externally supplied files.
//! * [`ResourceManager`] / [`ResourceHandle`] / [`ResourceSlot`] — the
//!   slot-based lifecycle manager guaranteeing at most one live handle per
//!   slot and no reads after invalidation.

pub mod artifact;
pub mod intake;
pub mod resources;

pub use artifact::AudioArtifact;
pub use intake::FileIntake;
pub use resources::{
    new_shared_resources, ResourceError, ResourceHandle, ResourceManager, ResourceSlot,
    SharedResources,
};
