//! # Global runtime configuration.
//!
//! Provides [`Config`] — centralized settings for the orchestrator runtime
//! and the capture pipeline.
//!
//! Config is used in two ways:
//! 1. **Driver creation**: `OrchestratorDriver::new(orchestrator, &config)`
//! 2. **Pipeline creation**: `CapturePipeline::new(.., &config)`
//!
//! ## Sentinel values
//! - `update_tick = 0s` → no sleep between update cycles, only a scheduler yield
//! - `capture_poll = 0s` → same, for the producer and fan-out loops
//! - `grace = 0s` → no wait on shutdown, report immediately

use std::time::Duration;

/// Global configuration for the orchestrator runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for workers to stop cooperatively (`0s` = no wait)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `update_tick`: pause between orchestrator update cycles (`0s` = yield only)
/// - `capture_poll`: pause between capture/publish loop iterations (`0s` = yield only)
///
/// ## Notes
/// All fields are public for flexibility. A zero tick keeps the original
/// retry-on-next-iteration semantics while staying cooperative on the async
/// runtime; a non-zero tick bounds CPU use when the source is idle.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for a cooperative stop before reporting
    /// `GraceExceeded`.
    ///
    /// Cancellation is cooperative: a blocking call inside an update cycle
    /// is not preempted, so shutdown latency equals the duration of whatever
    /// call is in flight.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Pause between orchestrator update cycles.
    ///
    /// `Duration::ZERO` means no sleep: the driver yields to the scheduler
    /// between cycles.
    pub update_tick: Duration,

    /// Pause between capture producer / frame fan-out loop iterations.
    ///
    /// Applies to both the store-fill loop and the publish loop.
    /// `Duration::ZERO` means no sleep, only a scheduler yield.
    pub capture_poll: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s` (reasonable cooperative-stop window)
    /// - `bus_capacity = 1024` (good baseline)
    /// - `update_tick = 0s` (yield between cycles)
    /// - `capture_poll = 0s` (yield between iterations)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            update_tick: Duration::ZERO,
            capture_poll: Duration::ZERO,
        }
    }
}
