//! Error types used by the subvisor runtime.
//!
//! This module defines two main error enums:
//!
//! - [`OrchestratorError`] — errors raised while resolving the descriptor graph.
//! - [`RuntimeError`] — errors raised by the runtime itself (shutdown path).
//!
//! Phase dispatch (`initialize`/`start`/`update`/`inject`) never returns an
//! error: a subsystem whose build failed is skipped silently, and transient
//! capture conditions are retried in place. Errors surface only from
//! construction and from the shutdown path.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while resolving the descriptor graph.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The dependency graph contains a cycle. The chain lists descriptor
    /// names from the first revisited node back to itself.
    ///
    /// This is a configuration error: the descriptor set must be acyclic.
    #[error("dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle {
        /// Descriptor names along the cycle, first node repeated at the end.
        chain: Vec<String>,
    },
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::DependencyCycle { .. } => "dependency_cycle",
        }
    }
}

/// # Errors produced by the runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Cooperative stop did not complete within the grace period; the worker
    /// is still inside an update cycle or a blocking call.
    #[error("shutdown grace {grace:?} exceeded; worker {worker} still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Name of the worker that did not stop in time.
        worker: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}
