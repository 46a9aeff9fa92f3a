//! # Orchestrator: phase-ordered dispatch over the built subsystem set.
//!
//! [`Orchestrator`] resolves the descriptor DAG into concrete subsystem
//! instances at construction, then exposes four operations, each defined
//! purely in terms of a stable ordering of the descriptor set by one of the
//! three priority fields.
//!
//! ## Architecture
//! ```text
//! Vec<DescriptorRef> ──► Orchestrator::new()
//!     ├─► resolver::build_all()        (recursive, dependency-first, memoized)
//!     └─► PhaseOrder::compute()        (three stable sorts, computed once)
//!
//! initialize() ──► built subsystems in init-priority order
//! start()      ──► built subsystems in start-priority order
//! update()     ──► built subsystems in update-priority order   (per tick)
//! inject(ev)   ──► ALL built subsystems in update-priority order
//! ```
//!
//! ## Rules
//! - Ties preserve descriptor-list order (stable sort → a total order is
//!   always defined).
//! - Execution order is independent of build order: the DAG edges decide who
//!   builds first, the priorities decide who runs first.
//! - A descriptor whose build failed is skipped **silently** in every phase;
//!   no error escapes a phase call. Observe outcomes via the bus or
//!   [`Subsystem::state`](crate::Subsystem::state).
//! - Phase dispatch executes synchronously within the calling task;
//!   concurrency arises only from workers each subsystem may itself spawn.

use crate::core::descriptor::DescriptorRef;
use crate::core::resolver;
use crate::core::subsystem::{InjectEvent, SubsystemRef};
use crate::error::OrchestratorError;
use crate::events::Bus;

/// Phase orders as descriptor-list indices, computed once at construction.
struct PhaseOrder {
    init: Vec<usize>,
    start: Vec<usize>,
    update: Vec<usize>,
}

impl PhaseOrder {
    fn compute(descriptors: &[DescriptorRef]) -> Self {
        let mut init: Vec<usize> = (0..descriptors.len()).collect();
        let mut start = init.clone();
        let mut update = init.clone();
        // sort_by_key is stable: equal priorities keep list order.
        init.sort_by_key(|&i| descriptors[i].priorities().init);
        start.sort_by_key(|&i| descriptors[i].priorities().start);
        update.sort_by_key(|&i| descriptors[i].priorities().update);
        Self {
            init,
            start,
            update,
        }
    }
}

/// Resolves the descriptor DAG and dispatches the three lifecycle phases.
pub struct Orchestrator {
    descriptors: Vec<DescriptorRef>,
    order: PhaseOrder,
    bus: Bus,
}

impl Orchestrator {
    /// Builds every descriptor (dependencies first) and precomputes the
    /// three phase orders.
    ///
    /// Fails only on a cyclic dependency graph; builder failures are
    /// recorded per descriptor and skipped in every phase.
    pub fn new(descriptors: Vec<DescriptorRef>, bus: Bus) -> Result<Self, OrchestratorError> {
        resolver::build_all(&descriptors, &bus)?;
        let order = PhaseOrder::compute(&descriptors);
        Ok(Self {
            descriptors,
            order,
            bus,
        })
    }

    /// Runs `initialize` on every built subsystem, ascending init priority.
    pub async fn initialize(&self) {
        for &i in &self.order.init {
            if let Some(subsystem) = self.descriptors[i].built() {
                subsystem.initialize().await;
            }
        }
    }

    /// Runs `start` on every built subsystem, ascending start priority.
    pub async fn start(&self) {
        for &i in &self.order.start {
            if let Some(subsystem) = self.descriptors[i].built() {
                subsystem.start().await;
            }
        }
    }

    /// Runs one update cycle: `update` on every built subsystem, ascending
    /// update priority. Intended to be invoked repeatedly, once per tick.
    pub async fn update(&self) {
        for &i in &self.order.update {
            if let Some(subsystem) = self.descriptors[i].built() {
                subsystem.update().await;
            }
        }
    }

    /// Broadcasts an injection event to every built subsystem in update
    /// priority order, regardless of lifecycle phase.
    ///
    /// Interleaves with ongoing update cycles with no additional
    /// synchronization beyond each subsystem's internal locking; serializing
    /// concurrent callers is the caller's responsibility.
    pub async fn inject(&self, event: &InjectEvent) {
        for &i in &self.order.update {
            if let Some(subsystem) = self.descriptors[i].built() {
                subsystem.inject(event).await;
            }
        }
    }

    /// Looks up a built subsystem by descriptor name.
    pub fn subsystem(&self, name: &str) -> Option<SubsystemRef> {
        self.descriptors
            .iter()
            .find(|d| d.name() == name)
            .and_then(|d| d.built())
    }

    /// The descriptor set, in original list order.
    pub fn descriptors(&self) -> &[DescriptorRef] {
        &self.descriptors
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}
