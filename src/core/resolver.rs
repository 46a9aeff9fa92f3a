//! # Dependency resolver: memoized, dependency-first subsystem construction.
//!
//! Given the full descriptor set, produce a build outcome for every
//! descriptor such that no descriptor is built before all of its
//! dependencies.
//!
//! ## Algorithm
//! Recursively visit each descriptor:
//! - already resolved → skip (memoization: at most one build per descriptor,
//!   even when referenced by multiple parents);
//! - otherwise build all dependencies first, then feed the builder each
//!   dependency's built instance in dependency-list order, each static
//!   argument in its own list order, and invoke the terminal `build`.
//!
//! ## Cycle handling
//! The resolver keeps an explicit visiting stack; a descriptor revisited
//! while on the stack is a fatal configuration error reported as
//! [`OrchestratorError::DependencyCycle`] with the full name chain.
//!
//! ## Failure semantics
//! A builder returning `None` records a failed build: `SubsystemBuilt` /
//! `BuildSkipped` is published either way, no error is raised, and the
//! orchestrator skips the descriptor in every phase.

use crate::core::descriptor::{DescriptorRef, SubsystemDescriptor};
use crate::error::OrchestratorError;
use crate::events::{Bus, Event, EventKind};

/// Builds every descriptor in the set, dependencies first.
pub(crate) fn build_all(
    descriptors: &[DescriptorRef],
    bus: &Bus,
) -> Result<(), OrchestratorError> {
    let mut visiting: Vec<(*const SubsystemDescriptor, String)> = Vec::new();
    for desc in descriptors {
        build_one(desc, &mut visiting, bus)?;
    }
    Ok(())
}

fn build_one(
    desc: &DescriptorRef,
    visiting: &mut Vec<(*const SubsystemDescriptor, String)>,
    bus: &Bus,
) -> Result<(), OrchestratorError> {
    if desc.is_resolved() {
        return Ok(());
    }

    let ptr = std::sync::Arc::as_ptr(desc);
    if let Some(first) = visiting.iter().position(|(p, _)| *p == ptr) {
        let mut chain: Vec<String> = visiting[first..].iter().map(|(_, n)| n.clone()).collect();
        chain.push(desc.name().to_string());
        return Err(OrchestratorError::DependencyCycle { chain });
    }

    visiting.push((ptr, desc.name().to_string()));
    let dependencies = desc.dependencies();
    for dep in &dependencies {
        build_one(dep, visiting, bus)?;
    }
    visiting.pop();

    let static_args = desc.take_static_args();
    let instance = desc.with_builder(|builder| {
        for dep in &dependencies {
            // A failed dependency is not delivered; the builder decides
            // whether it can build without it.
            if let Some(built) = dep.built() {
                builder.with_dependency(built);
            }
        }
        for arg in static_args {
            builder.with_arg(arg);
        }
        builder.build()
    });

    let kind = if instance.is_some() {
        EventKind::SubsystemBuilt
    } else {
        EventKind::BuildSkipped
    };
    bus.publish(Event::now(kind).with_subsystem(desc.name().to_string()));

    desc.record_built(instance);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{BuildArg, SubsystemBuilder};
    use crate::core::subsystem::{Subsystem, SubsystemRef};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct Recorded {
        name: &'static str,
    }

    #[async_trait]
    impl Subsystem for Recorded {
        fn name(&self) -> &str {
            self.name
        }
    }

    /// Builder that logs its build into a shared journal.
    struct JournalBuilder {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
        deps_seen: usize,
        args_seen: Vec<String>,
        fail: bool,
    }

    impl JournalBuilder {
        fn boxed(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                name,
                journal: journal.clone(),
                deps_seen: 0,
                args_seen: Vec::new(),
                fail: false,
            })
        }

        fn failing(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
            let mut b = Self::boxed(name, journal);
            b.fail = true;
            b
        }
    }

    impl SubsystemBuilder for JournalBuilder {
        fn with_dependency(&mut self, _dep: SubsystemRef) {
            self.deps_seen += 1;
        }

        fn with_arg(&mut self, arg: BuildArg) {
            if let Ok(s) = arg.downcast::<&'static str>() {
                self.args_seen.push((*s).to_string());
            }
        }

        fn build(&mut self) -> Option<SubsystemRef> {
            self.journal.lock().unwrap().push(format!(
                "{}(deps={},args={})",
                self.name,
                self.deps_seen,
                self.args_seen.join("+")
            ));
            if self.fail {
                None
            } else {
                Some(Arc::new(Recorded { name: self.name }))
            }
        }
    }

    fn bus() -> Bus {
        Bus::new(64)
    }

    #[test]
    fn test_dependencies_build_before_dependents() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let c = crate::SubsystemDescriptor::new("c", JournalBuilder::boxed("c", &journal)).arc();
        let b = crate::SubsystemDescriptor::new("b", JournalBuilder::boxed("b", &journal))
            .with_dependency(c.clone())
            .arc();
        let a = crate::SubsystemDescriptor::new("a", JournalBuilder::boxed("a", &journal))
            .with_dependency(b.clone())
            .with_dependency(c.clone())
            .arc();

        build_all(&[a.clone(), b.clone(), c.clone()], &bus()).unwrap();

        let log = journal.lock().unwrap().clone();
        assert_eq!(
            log,
            vec!["c(deps=0,args=)", "b(deps=1,args=)", "a(deps=2,args=)"],
            "build order must be dependency-first: C, B, A"
        );
        assert!(a.built().is_some() && b.built().is_some() && c.built().is_some());
    }

    #[test]
    fn test_diamond_builds_shared_dependency_once() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let base =
            crate::SubsystemDescriptor::new("base", JournalBuilder::boxed("base", &journal)).arc();
        let left = crate::SubsystemDescriptor::new("left", JournalBuilder::boxed("left", &journal))
            .with_dependency(base.clone())
            .arc();
        let right =
            crate::SubsystemDescriptor::new("right", JournalBuilder::boxed("right", &journal))
                .with_dependency(base.clone())
                .arc();
        let top = crate::SubsystemDescriptor::new("top", JournalBuilder::boxed("top", &journal))
            .with_dependency(left.clone())
            .with_dependency(right.clone())
            .arc();

        build_all(&[top, left, right, base.clone()], &bus()).unwrap();

        let log = journal.lock().unwrap().clone();
        let base_builds = log.iter().filter(|l| l.starts_with("base")).count();
        assert_eq!(base_builds, 1, "memoization: base built exactly once");
    }

    #[test]
    fn test_static_args_fed_in_list_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let d = crate::SubsystemDescriptor::new("d", JournalBuilder::boxed("d", &journal))
            .with_static_arg(Box::new("one"))
            .with_static_arg(Box::new("two"))
            .arc();
        build_all(&[d], &bus()).unwrap();
        assert_eq!(journal.lock().unwrap().clone(), vec!["d(deps=0,args=one+two)"]);
    }

    #[test]
    fn test_cycle_reports_name_chain() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let a = crate::SubsystemDescriptor::new("a", JournalBuilder::boxed("a", &journal)).arc();
        let b = crate::SubsystemDescriptor::new("b", JournalBuilder::boxed("b", &journal))
            .with_dependency(a.clone())
            .arc();
        a.push_dependency(b.clone());

        let err = build_all(&[a, b], &bus()).unwrap_err();
        match err {
            OrchestratorError::DependencyCycle { chain } => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
        }
        assert!(journal.lock().unwrap().is_empty(), "nothing built on cycle");
    }

    #[test]
    fn test_failed_dependency_not_delivered_to_parent() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let broken =
            crate::SubsystemDescriptor::new("broken", JournalBuilder::failing("broken", &journal))
                .arc();
        let parent =
            crate::SubsystemDescriptor::new("parent", JournalBuilder::boxed("parent", &journal))
                .with_dependency(broken.clone())
                .arc();

        build_all(&[parent.clone(), broken.clone()], &bus()).unwrap();

        assert!(broken.is_resolved() && broken.built().is_none());
        let log = journal.lock().unwrap().clone();
        assert!(log.contains(&"parent(deps=0,args=)".to_string()));
    }

    #[tokio::test]
    async fn test_build_outcome_events_published() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let bus = bus();
        let mut rx = bus.subscribe();
        let ok = crate::SubsystemDescriptor::new("ok", JournalBuilder::boxed("ok", &journal)).arc();
        let bad =
            crate::SubsystemDescriptor::new("bad", JournalBuilder::failing("bad", &journal)).arc();

        build_all(&[ok, bad], &bus).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::SubsystemBuilt);
        assert_eq!(first.subsystem.as_deref(), Some("ok"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, EventKind::BuildSkipped);
        assert_eq!(second.subsystem.as_deref(), Some("bad"));
    }
}
