//! # Subsystem descriptor: one node of the dependency DAG.
//!
//! [`SubsystemDescriptor`] bundles everything the resolver needs to build one
//! subsystem: the builder, the ordered dependency list, the ordered static
//! argument list, and the three phase priorities.
//!
//! ## Rules
//! - `built` transitions absent → present **exactly once** and never reverts
//!   (enforced with `OnceLock`); the recorded value may itself be `None`,
//!   which marks a build failure.
//! - Descriptors are read-only after the set is handed to the orchestrator,
//!   except for that single build-time mutation.

use std::borrow::Cow;
use std::sync::{Mutex, OnceLock};

use crate::core::builder::{BuildArg, SubsystemBuilder};
use crate::core::subsystem::SubsystemRef;

/// Shared handle to a descriptor; dependency lists hold these.
pub type DescriptorRef = std::sync::Arc<SubsystemDescriptor>;

/// The three phase priorities of one descriptor.
///
/// Lower values run earlier. Each phase is ordered independently; execution
/// order is decoupled from build order by design — a subsystem may need to
/// build early (to satisfy a dependent) but update late, or vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Priorities {
    /// Ordering key for the initialize phase.
    pub init: i32,
    /// Ordering key for the start phase.
    pub start: i32,
    /// Ordering key for the update phase (also used for `inject` routing).
    pub update: i32,
}

/// DAG node describing how to build one subsystem and when to run it.
pub struct SubsystemDescriptor {
    name: Cow<'static, str>,
    builder: Mutex<Box<dyn SubsystemBuilder>>,
    // Consumed (moved into the builder) during the single build pass.
    static_args: Mutex<Vec<BuildArg>>,
    // Mutable until the resolver runs; late registration keeps descriptor
    // construction order independent of reference order.
    dependencies: Mutex<Vec<DescriptorRef>>,
    priorities: Priorities,
    built: OnceLock<Option<SubsystemRef>>,
}

impl SubsystemDescriptor {
    /// Creates a descriptor with default (zero) priorities and no
    /// dependencies or static arguments.
    pub fn new(name: impl Into<Cow<'static, str>>, builder: Box<dyn SubsystemBuilder>) -> Self {
        Self {
            name: name.into(),
            builder: Mutex::new(builder),
            static_args: Mutex::new(Vec::new()),
            dependencies: Mutex::new(Vec::new()),
            priorities: Priorities::default(),
            built: OnceLock::new(),
        }
    }

    /// Appends a dependency (build-before relation), preserving list order.
    pub fn with_dependency(self, dep: DescriptorRef) -> Self {
        self.dependencies.lock().unwrap().push(dep);
        self
    }

    /// Appends a static build argument, preserving list order.
    pub fn with_static_arg(self, arg: BuildArg) -> Self {
        self.static_args.lock().unwrap().push(arg);
        self
    }

    /// Sets the three phase priorities.
    pub fn with_priorities(mut self, init: i32, start: i32, update: i32) -> Self {
        self.priorities = Priorities {
            init,
            start,
            update,
        };
        self
    }

    /// Wraps the descriptor into its shared handle.
    pub fn arc(self) -> DescriptorRef {
        std::sync::Arc::new(self)
    }

    /// Registers a dependency on an already shared descriptor.
    ///
    /// Valid only before the set is handed to the orchestrator.
    pub fn push_dependency(&self, dep: DescriptorRef) {
        self.dependencies.lock().unwrap().push(dep);
    }

    /// The descriptor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The three phase priorities.
    pub fn priorities(&self) -> Priorities {
        self.priorities
    }

    /// Snapshot of the dependency list (cheap `Arc` clones).
    pub(crate) fn dependencies(&self) -> Vec<DescriptorRef> {
        self.dependencies.lock().unwrap().clone()
    }

    /// Drains the static arguments for the build pass.
    pub(crate) fn take_static_args(&self) -> Vec<BuildArg> {
        std::mem::take(&mut self.static_args.lock().unwrap())
    }

    /// Runs the builder under its lock.
    pub(crate) fn with_builder<R>(&self, f: impl FnOnce(&mut dyn SubsystemBuilder) -> R) -> R {
        let mut builder = self.builder.lock().unwrap();
        f(builder.as_mut())
    }

    /// Records the build outcome. At most one call ever observes `Ok`; the
    /// resolver's memoization guard makes a second call unreachable.
    pub(crate) fn record_built(&self, instance: Option<SubsystemRef>) {
        let _ = self.built.set(instance);
    }

    /// Returns whether the build pass has visited this descriptor
    /// (successfully or not).
    pub fn is_resolved(&self) -> bool {
        self.built.get().is_some()
    }

    /// The built subsystem, or `None` if not yet built or the build failed.
    pub fn built(&self) -> Option<SubsystemRef> {
        self.built.get().and_then(|slot| slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subsystem::Subsystem;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Nop;

    #[async_trait]
    impl Subsystem for Nop {
        fn name(&self) -> &str {
            "nop"
        }
    }

    struct NopBuilder;

    impl SubsystemBuilder for NopBuilder {
        fn build(&mut self) -> Option<SubsystemRef> {
            Some(Arc::new(Nop))
        }
    }

    #[test]
    fn test_built_slot_is_write_once() {
        let desc = SubsystemDescriptor::new("a", Box::new(NopBuilder));
        assert!(!desc.is_resolved());
        let first: SubsystemRef = Arc::new(Nop);
        desc.record_built(Some(first.clone()));
        desc.record_built(None);
        assert!(desc.is_resolved());
        let kept = desc.built().expect("first write wins");
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[test]
    fn test_priorities_roundtrip() {
        let desc = SubsystemDescriptor::new("a", Box::new(NopBuilder)).with_priorities(3, 1, 2);
        assert_eq!(
            desc.priorities(),
            Priorities {
                init: 3,
                start: 1,
                update: 2
            }
        );
    }
}
