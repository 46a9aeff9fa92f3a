//! # Subsystem capability set and typed injection events.
//!
//! This module defines the [`Subsystem`] trait — the capability set every
//! orchestrated component exposes — and [`InjectEvent`], the tagged payload
//! routed to all subsystems by [`Orchestrator::inject`](crate::Orchestrator::inject).
//!
//! All phase methods default to no-ops so a concrete subsystem implements
//! only the phases it participates in (composition over inheritance: one
//! capability trait per role, no base-class chains).

use std::sync::Arc;

use async_trait::async_trait;

/// Opaque handle to a detected input/output device, delivered to subsystems
/// that were built before the device was known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u64);

/// Typed event payloads for [`Subsystem::inject`].
///
/// Each variant carries a strongly typed payload; the orchestrator routes by
/// variant to **all** built subsystems and never interprets the contents.
/// Used for late-bound dependency delivery: a subsystem may be built early
/// (to satisfy a dependent) with incomplete information and receive the rest
/// here once it is known.
#[derive(Debug, Clone)]
pub enum InjectEvent {
    /// A device the agent should drive was detected at runtime.
    DeviceDetected {
        /// OS-level handle to the device.
        device: DeviceHandle,
    },
    /// The capture/automation target process changed.
    TargetProcessChanged {
        /// New target process name.
        process: Arc<str>,
    },
    /// A macro slot was triggered by the user.
    MacroTriggered {
        /// Macro slot index.
        slot: u32,
    },
}

impl InjectEvent {
    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InjectEvent::DeviceDetected { .. } => "device_detected",
            InjectEvent::TargetProcessChanged { .. } => "target_process_changed",
            InjectEvent::MacroTriggered { .. } => "macro_triggered",
        }
    }
}

/// Coarse lifecycle state a subsystem may expose via [`Subsystem::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemState {
    /// Built but not yet initialized.
    Built,
    /// `initialize` + `start` completed; update cycles may be running.
    Started,
    /// The subsystem's workers have stopped.
    Stopped,
}

/// # Capability set of an orchestrated subsystem.
///
/// Phase methods are invoked by the orchestrator in phase-priority order:
/// `initialize` once, `start` once, `update` repeatedly (once per scheduler
/// tick). `inject` may interleave with update cycles at any time; concurrent
/// access is the subsystem's own responsibility (internal locking).
///
/// All methods default to no-ops.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use subvisor::{InjectEvent, Subsystem};
///
/// struct InputReplay;
///
/// #[async_trait]
/// impl Subsystem for InputReplay {
///     fn name(&self) -> &str { "input-replay" }
///
///     async fn update(&self) {
///         // advance the replay cursor...
///     }
/// }
/// ```
#[async_trait]
pub trait Subsystem: Send + Sync + 'static {
    /// Returns a stable, human-readable subsystem name.
    fn name(&self) -> &str;

    /// One-time initialization, runs before any `start`.
    async fn initialize(&self) {}

    /// One-time startup, runs after every subsystem's `initialize` completed.
    async fn start(&self) {}

    /// One update cycle; invoked repeatedly while the driver is running.
    async fn update(&self) {}

    /// Receives a broadcast injection event. Interleaves with update cycles;
    /// implementations guard their own state.
    async fn inject(&self, _event: &InjectEvent) {}

    /// Optional coarse lifecycle state for external observers.
    fn state(&self) -> Option<SubsystemState> {
        None
    }
}

/// Shared handle to a built subsystem.
pub type SubsystemRef = Arc<dyn Subsystem>;
