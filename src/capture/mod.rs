//! # Concurrent frame-capture pipeline.
//!
//! - [`FrameStore`]: mutex-guarded single-slot latest-wins frame holder.
//! - [`CountdownBarrier`]: resettable countdown latch for publish cycles.
//! - [`FramePublisher`]: fans one frame out to all sinks and blocks until
//!   every sink signalled completion.
//! - [`CapturePipeline`]: producer + fan-out workers as a [`Subsystem`](crate::Subsystem).

mod barrier;
mod frame;
mod pipeline;
mod publisher;
mod sink;
mod source;
mod store;

pub use barrier::CountdownBarrier;
pub use frame::{CaptureFrame, FrameRef};
pub use pipeline::{CapturePipeline, CapturePipelineBuilder};
pub use publisher::FramePublisher;
pub use sink::FrameSink;
pub use source::CaptureSource;
pub use store::FrameStore;
