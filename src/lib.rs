//! # subvisor
//!
//! **Subvisor** is a subsystem lifecycle orchestration library for Rust.
//!
//! It provides primitives to build a set of interdependent subsystems in
//! dependency order, run them through three independently prioritized
//! phases, and drive a barrier-synchronized frame-capture fan-out — the
//! concurrent core of a desktop automation agent. UI, configuration
//! loading, platform capture APIs, and input encoding stay outside, behind
//! the narrow [`CaptureSource`] and [`SubsystemBuilder`] contracts.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//!     │ SubsystemDescr.  │   │ SubsystemDescr.  │   │ SubsystemDescr.  │
//!     │ (builder, deps,  │   │                  │   │                  │
//!     │  3 priorities)   │   │                  │   │                  │
//!     └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!              ▼                      ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                         │
//! │  - resolver: recursive, dependency-first, memoized construction       │
//! │  - three phase orders (stable sorts, computed once at construction)   │
//! │  - initialize() / start() / update() / inject()                       │
//! └────────┬──────────────────────────────────────────────────────────────┘
//!          │ hosted by
//!          ▼
//! ┌──────────────────────┐        ┌─────────────────────────────────────┐
//! │  OrchestratorDriver  │        │  CapturePipeline (one subsystem)    │
//! │  (managed worker)    │        │                                     │
//! │  initialize + start  │        │  producer ──► FrameStore (1 slot)   │
//! │  once, then update   │        │                  │                  │
//! │  loop while running  │        │  fan-out ◄───────┘                  │
//! └──────────────────────┘        │     │ publish(frame, changed)       │
//!                                 │     ▼                               │
//!                                 │  FramePublisher ── barrier.reset(N) │
//!                                 │    ├─► sink worker 1 ─► signal()    │
//!                                 │    ├─► sink worker 2 ─► signal()    │
//!                                 │    └─► sink worker N ─► signal()    │
//!                                 │  barrier.wait()  (N signals)        │
//!                                 └─────────────────────────────────────┘
//!
//! Events (built/skipped, worker lifecycle, capture transitions, shutdown)
//! flow through a broadcast Bus; subscribe for logging or metrics.
//! ```
//!
//! ### Lifecycle
//! ```text
//! Vec<DescriptorRef> ──► Orchestrator::new()     (build, dependency-first)
//!                              │
//!                              ▼
//!                    OrchestratorDriver::start()
//!                              │
//!                              ├─► initialize()   (ascending init priority)
//!                              ├─► start()        (ascending start priority)
//!                              ├─► ready = true
//!                              └─► loop while running:
//!                                    update()     (ascending update priority)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use subvisor::{
//!     Bus, Config, Orchestrator, OrchestratorDriver, Subsystem, SubsystemBuilder,
//!     SubsystemDescriptor, SubsystemRef,
//! };
//!
//! struct Heartbeat;
//!
//! #[async_trait]
//! impl Subsystem for Heartbeat {
//!     fn name(&self) -> &str { "heartbeat" }
//!
//!     async fn update(&self) {
//!         // poll devices, advance macros...
//!     }
//! }
//!
//! struct HeartbeatBuilder;
//!
//! impl SubsystemBuilder for HeartbeatBuilder {
//!     fn build(&mut self) -> Option<SubsystemRef> {
//!         Some(Arc::new(Heartbeat))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let bus = Bus::new(cfg.bus_capacity_clamped());
//!
//!     let heartbeat = SubsystemDescriptor::new("heartbeat", Box::new(HeartbeatBuilder))
//!         .with_priorities(1, 1, 1)
//!         .arc();
//!
//!     let orchestrator = Arc::new(Orchestrator::new(vec![heartbeat], bus)?);
//!     let driver = OrchestratorDriver::new(orchestrator, &cfg);
//!
//!     driver.start();
//!     // In a real agent: driver.run_until_shutdown().await?;
//!     driver.stop();
//!     driver.join(cfg.grace).await;
//!     Ok(())
//! }
//! ```

mod capture;
mod config;
mod core;
mod error;
mod events;
mod runtime;

// ---- Public re-exports ----

pub use capture::{
    CaptureFrame, CapturePipeline, CapturePipelineBuilder, CaptureSource, CountdownBarrier,
    FramePublisher, FrameRef, FrameSink, FrameStore,
};
pub use config::Config;
pub use core::{
    BuildArg, DescriptorRef, DeviceHandle, InjectEvent, Orchestrator, OrchestratorDriver,
    Priorities, Subsystem, SubsystemBuilder, SubsystemDescriptor, SubsystemRef, SubsystemState,
};
pub use error::{OrchestratorError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use runtime::{RunFlag, Worker, wait_for_shutdown_signal};

// Optional: expose a simple built-in stdout event printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
