//! # Frame sink trait.
//!
//! `FrameSink` is the extension point for plugging frame consumers into the
//! capture pipeline. Each sink is driven by a dedicated worker fed through a
//! private one-slot handoff owned by the
//! [`FramePublisher`](crate::FramePublisher).
//!
//! ## Contract
//! - `process_frame` runs on the sink's own worker; a slow sink delays only
//!   the shared publish cycle, never a specific other sink's delivery.
//! - The publisher never starts a new cycle before every sink finished the
//!   previous one: at most one frame is in flight per sink.

use async_trait::async_trait;

use crate::capture::frame::FrameRef;

/// Contract for frame consumers.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use subvisor::{FrameRef, FrameSink};
///
/// struct PixelCounter;
///
/// #[async_trait]
/// impl FrameSink for PixelCounter {
///     fn name(&self) -> &'static str { "pixel-counter" }
///
///     async fn process_frame(&self, frame: &FrameRef, changed: bool) {
///         if changed {
///             let _ = frame.pixels().len();
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait FrameSink: Send + Sync + 'static {
    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Processes one delivered frame.
    ///
    /// `changed` is false when the frame is identical (by capture identity)
    /// to the previously published one — the heartbeat case.
    async fn process_frame(&self, frame: &FrameRef, changed: bool);
}
