//! # Runtime events emitted by the orchestrator, workers, and the capture pipeline.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Build events**: descriptor resolution outcomes (built, skipped)
//! - **Worker events**: managed worker lifecycle (started, stopped, ready)
//! - **Capture events**: capture-source availability transitions and sink panics
//! - **Shutdown events**: signal observed, grace outcome
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! subsystem/worker names, and free-form reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Build events ===
    /// A descriptor's builder produced a subsystem instance.
    ///
    /// Sets:
    /// - `subsystem`: descriptor name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubsystemBuilt,

    /// A descriptor's builder returned no instance; the subsystem is
    /// silently skipped in every phase.
    ///
    /// Sets:
    /// - `subsystem`: descriptor name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BuildSkipped,

    // === Worker events ===
    /// A managed worker was started.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStarted,

    /// A managed worker's loop body returned.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStopped,

    /// The orchestrator driver finished `initialize` + `start` and entered
    /// its update loop.
    ///
    /// Sets:
    /// - `worker`: driver name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    OrchestratorReady,

    // === Capture events ===
    /// The capture source started yielding frames after being unavailable.
    ///
    /// Sets:
    /// - `subsystem`: pipeline name
    /// - `reason`: target process name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CaptureAcquired,

    /// The capture source stopped yielding frames. Not an error: the
    /// producer keeps retrying until the source reappears.
    ///
    /// Sets:
    /// - `subsystem`: pipeline name
    /// - `reason`: target process name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CaptureLost,

    /// A frame sink panicked while processing a frame. The publish cycle
    /// still completes (the barrier is signalled on the sink's behalf).
    ///
    /// Sets:
    /// - `subsystem`: sink name
    /// - `reason`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SinkPanicked,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShutdownRequested,

    /// The driver stopped within the configured grace period.
    ///
    /// Sets:
    /// - `worker`: driver name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StoppedWithinGrace,

    /// Grace period exceeded; the driver's update loop did not reach an
    /// iteration boundary in time.
    ///
    /// Sets:
    /// - `worker`: driver name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the subsystem or descriptor, if applicable.
    pub subsystem: Option<Arc<str>>,
    /// Name of the managed worker, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (panic info, process name, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subsystem: None,
            worker: None,
            reason: None,
        }
    }

    /// Attaches a subsystem/descriptor name.
    #[inline]
    pub fn with_subsystem(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subsystem = Some(name.into());
        self
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, name: impl Into<Arc<str>>) -> Self {
        self.worker = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a sink panic event.
    #[inline]
    pub fn sink_panicked(sink: &'static str, info: String) -> Self {
        Event::now(EventKind::SinkPanicked)
            .with_subsystem(sink)
            .with_reason(info)
    }
}
