//! # Capture source contract.
//!
//! The pipeline consumes frames through this narrow interface; window
//! enumeration, pixel format conversion, and platform capture APIs live
//! behind it, outside this crate.

use async_trait::async_trait;

use crate::capture::frame::CaptureFrame;

/// Produces frames for a named target process.
///
/// Returning `None` is not an error: the source is expected to appear and
/// disappear opportunistically (target process not running, window
/// destroyed). The producer loop retries on the next iteration.
#[async_trait]
pub trait CaptureSource: Send + Sync + 'static {
    /// Attempts to capture one frame of the named process.
    async fn capture(&self, process: &str) -> Option<CaptureFrame>;
}
