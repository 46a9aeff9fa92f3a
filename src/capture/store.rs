//! # Latest-wins frame store.
//!
//! [`FrameStore`] is a mutex-guarded single-slot holder of the most recent
//! captured frame. Each write discards the previous value: no history, no
//! queue, no backpressure at this layer (unbounded producer rate).
//!
//! The store is the only structure mutated by two independent workers
//! (producer writer, fan-out reader); a single exclusive lock guards both
//! operations. The lock is never held across an await.

use std::sync::Mutex;

use crate::capture::frame::FrameRef;

/// Single mutable slot holding the latest captured frame.
pub struct FrameStore {
    latest: Mutex<Option<FrameRef>>,
}

impl FrameStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
        }
    }

    /// Replaces the slot with the given frame, discarding the previous one.
    pub fn set_latest(&self, frame: FrameRef) {
        *self.latest.lock().unwrap() = Some(frame);
    }

    /// Returns the current slot value, or `None` if nothing was captured yet.
    ///
    /// Safe for any external consumer needing the current frame without
    /// joining the publish barrier.
    pub fn latest(&self) -> Option<FrameRef> {
        self.latest.lock().unwrap().clone()
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}
