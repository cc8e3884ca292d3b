//! Resource lifecycle manager — named slots holding revocable binary handles.
//!
//! [`ResourceManager`] owns one slot per playback destination (input preview,
//! reply audio). Each slot holds at most one live [`ResourceHandle`]; when a
//! new handle is registered for a slot the previous one is revoked, but only
//! *after* the replacement exists, so a reader polling the slot never
//! observes neither handle.
//!
//! Revocation is structural: a revoked handle's [`ResourceHandle::bytes`]
//! returns [`ResourceError::Revoked`] forever after. Presentation code that
//! cached a stale handle gets an error, not dangling data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ResourceSlot
// ---------------------------------------------------------------------------

/// Named logical destination for a resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSlot {
    /// Preview of the current input artifact (recorded or uploaded).
    InputPreview,
    /// The synthesized reply produced by the final pipeline stage.
    ReplyAudio,
}

impl ResourceSlot {
    /// Stable name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceSlot::InputPreview => "input-preview",
            ResourceSlot::ReplyAudio => "reply-audio",
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceError
// ---------------------------------------------------------------------------

/// Errors surfaced by resource handles.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The handle was invalidated by a later `register` or a `dispose`.
    #[error("resource handle for slot '{0}' has been revoked")]
    Revoked(&'static str),
}

// ---------------------------------------------------------------------------
// ResourceHandle
// ---------------------------------------------------------------------------

/// A dereferenceable reference to binary data, valid until revoked.
///
/// Handles are shared via `Arc`; the manager keeps one reference per slot and
/// revokes it when the slot is replaced or disposed. All reads go through
/// [`bytes`](Self::bytes), which fails once the handle is revoked.
#[derive(Debug)]
pub struct ResourceHandle {
    slot: ResourceSlot,
    payload: Vec<u8>,
    mime: String,
    revoked: AtomicBool,
}

impl ResourceHandle {
    fn new(slot: ResourceSlot, payload: Vec<u8>, mime: String) -> Self {
        Self {
            slot,
            payload,
            mime,
            revoked: AtomicBool::new(false),
        }
    }

    /// The slot this handle was registered under.
    pub fn slot(&self) -> ResourceSlot {
        self.slot
    }

    /// MIME type of the backing payload.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Returns `true` while the handle may still be read.
    pub fn is_valid(&self) -> bool {
        !self.revoked.load(Ordering::Acquire)
    }

    /// Access the backing payload.
    ///
    /// # Errors
    ///
    /// [`ResourceError::Revoked`] once the handle has been superseded or
    /// disposed.
    pub fn bytes(&self) -> Result<&[u8], ResourceError> {
        if self.is_valid() {
            Ok(&self.payload)
        } else {
            Err(ResourceError::Revoked(self.slot.name()))
        }
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// ResourceManager
// ---------------------------------------------------------------------------

/// Owns the live handle for every slot and enforces the replace-then-revoke
/// ordering.
#[derive(Debug, Default)]
pub struct ResourceManager {
    slots: HashMap<ResourceSlot, Arc<ResourceHandle>>,
}

impl ResourceManager {
    /// Create an empty manager with no live handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload` under `slot`, returning the new live handle.
    ///
    /// The previous handle for the slot (if any) is revoked after the new one
    /// is installed — never before, so the slot is never observably empty
    /// during a replacement.
    pub fn register(
        &mut self,
        slot: ResourceSlot,
        payload: Vec<u8>,
        mime: impl Into<String>,
    ) -> Arc<ResourceHandle> {
        let handle = Arc::new(ResourceHandle::new(slot, payload, mime.into()));
        let previous = self.slots.insert(slot, Arc::clone(&handle));
        if let Some(old) = previous {
            old.revoke();
            log::debug!("resources: replaced handle in slot '{}'", slot.name());
        } else {
            log::debug!("resources: registered handle in slot '{}'", slot.name());
        }
        handle
    }

    /// Revoke and clear the handle in `slot` without replacement.
    pub fn dispose(&mut self, slot: ResourceSlot) {
        if let Some(old) = self.slots.remove(&slot) {
            old.revoke();
            log::debug!("resources: disposed slot '{}'", slot.name());
        }
    }

    /// Revoke and clear every slot. Called on "clear all" and on shutdown.
    pub fn dispose_all(&mut self) {
        for (_, handle) in self.slots.drain() {
            handle.revoke();
        }
    }

    /// The current live handle for `slot`, if one is registered.
    pub fn get(&self, slot: ResourceSlot) -> Option<Arc<ResourceHandle>> {
        self.slots.get(&slot).cloned()
    }

    /// Number of slots currently holding a live handle.
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

/// Thread-safe handle to the [`ResourceManager`].
///
/// Cheap to clone. Lock for short critical sections only; never hold the
/// lock across an `.await` point.
pub type SharedResources = Arc<Mutex<ResourceManager>>;

/// Construct a new [`SharedResources`] wrapping an empty manager.
pub fn new_shared_resources() -> SharedResources {
    Arc::new(Mutex::new(ResourceManager::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_returns_readable_handle() {
        let mut mgr = ResourceManager::new();
        let handle = mgr.register(ResourceSlot::InputPreview, vec![1, 2, 3], "audio/wav");

        assert!(handle.is_valid());
        assert_eq!(handle.bytes().unwrap(), &[1, 2, 3]);
        assert_eq!(handle.mime(), "audio/wav");
        assert_eq!(handle.slot(), ResourceSlot::InputPreview);
    }

    #[test]
    fn reregister_revokes_previous_handle() {
        let mut mgr = ResourceManager::new();
        let first = mgr.register(ResourceSlot::InputPreview, vec![1], "audio/wav");
        let second = mgr.register(ResourceSlot::InputPreview, vec![2], "audio/wav");

        assert!(!first.is_valid());
        assert!(matches!(
            first.bytes().unwrap_err(),
            ResourceError::Revoked("input-preview")
        ));
        assert!(second.is_valid());
        assert_eq!(second.bytes().unwrap(), &[2]);
    }

    #[test]
    fn only_latest_handle_is_valid_across_many_registrations() {
        let mut mgr = ResourceManager::new();
        let handles: Vec<_> = (0u8..5)
            .map(|i| mgr.register(ResourceSlot::ReplyAudio, vec![i], "audio/wav"))
            .collect();

        for old in &handles[..4] {
            assert!(!old.is_valid());
        }
        assert!(handles[4].is_valid());
        assert_eq!(mgr.live_count(), 1);
    }

    #[test]
    fn slots_are_independent() {
        let mut mgr = ResourceManager::new();
        let preview = mgr.register(ResourceSlot::InputPreview, vec![1], "audio/wav");
        let reply = mgr.register(ResourceSlot::ReplyAudio, vec![2], "audio/wav");

        // Replacing one slot must not touch the other.
        let _ = mgr.register(ResourceSlot::ReplyAudio, vec![3], "audio/wav");
        assert!(preview.is_valid());
        assert!(!reply.is_valid());
        assert_eq!(mgr.live_count(), 2);
    }

    #[test]
    fn dispose_revokes_and_clears_slot() {
        let mut mgr = ResourceManager::new();
        let handle = mgr.register(ResourceSlot::ReplyAudio, vec![9], "audio/wav");

        mgr.dispose(ResourceSlot::ReplyAudio);
        assert!(!handle.is_valid());
        assert!(mgr.get(ResourceSlot::ReplyAudio).is_none());
    }

    #[test]
    fn dispose_empty_slot_is_a_noop() {
        let mut mgr = ResourceManager::new();
        mgr.dispose(ResourceSlot::InputPreview);
        assert_eq!(mgr.live_count(), 0);
    }

    #[test]
    fn dispose_all_leaves_zero_live_handles() {
        let mut mgr = ResourceManager::new();
        let a = mgr.register(ResourceSlot::InputPreview, vec![1], "audio/wav");
        let b = mgr.register(ResourceSlot::ReplyAudio, vec![2], "audio/wav");

        mgr.dispose_all();
        assert!(!a.is_valid());
        assert!(!b.is_valid());
        assert_eq!(mgr.live_count(), 0);
    }

    #[test]
    fn drop_revokes_outstanding_handles() {
        let handle = {
            let mut mgr = ResourceManager::new();
            mgr.register(ResourceSlot::InputPreview, vec![1], "audio/wav")
        };
        assert!(!handle.is_valid());
    }

    #[test]
    fn shared_resources_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedResources>();
    }
}
