//! # Core orchestration: descriptors, resolver, phase dispatch, driver.
//!
//! - [`SubsystemDescriptor`]: one DAG node (builder, dependencies, priorities).
//! - resolver: recursive dependency-first construction with memoization and
//!   cycle diagnostics.
//! - [`Orchestrator`]: three independently prioritized phases plus `inject`.
//! - [`OrchestratorDriver`]: managed loop running the phases.

mod builder;
mod descriptor;
mod driver;
mod orchestrator;
mod resolver;
mod subsystem;

pub use builder::{BuildArg, SubsystemBuilder};
pub use descriptor::{DescriptorRef, Priorities, SubsystemDescriptor};
pub use driver::OrchestratorDriver;
pub use orchestrator::Orchestrator;
pub use subsystem::{DeviceHandle, InjectEvent, Subsystem, SubsystemRef, SubsystemState};
