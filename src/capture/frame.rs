//! # Captured frame value.
//!
//! [`CaptureFrame`] is an opaque immutable pixel buffer plus dimensions.
//! Once captured it is treated as a value: never mutated in place, shared by
//! handle ([`FrameRef`]). Pixel format interpretation belongs to the capture
//! source and the sinks, not to this crate.

use std::sync::Arc;

/// Immutable captured frame: pixel buffer + dimensions.
#[derive(Debug)]
pub struct CaptureFrame {
    width: u32,
    height: u32,
    pixels: Box<[u8]>,
}

/// Shared handle to a captured frame.
///
/// Identity (`Arc::ptr_eq`) distinguishes "same capture" from "new capture":
/// the fan-out loop marks `changed` when the handle differs from the last
/// published one.
pub type FrameRef = Arc<CaptureFrame>;

impl CaptureFrame {
    /// Creates a frame from raw pixel data.
    pub fn new(width: u32, height: u32, pixels: impl Into<Box<[u8]>>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether two handles refer to the same captured frame.
    #[inline]
    pub fn same_capture(a: &FrameRef, b: &FrameRef) -> bool {
        Arc::ptr_eq(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_content_equality() {
        let a: FrameRef = Arc::new(CaptureFrame::new(2, 2, vec![0u8; 16]));
        let b: FrameRef = Arc::new(CaptureFrame::new(2, 2, vec![0u8; 16]));
        assert!(CaptureFrame::same_capture(&a, &a.clone()));
        assert!(!CaptureFrame::same_capture(&a, &b));
    }
}
