//! # Subsystem builder contract.
//!
//! [`SubsystemBuilder`] is the factory capability referenced by a
//! [`SubsystemDescriptor`](crate::SubsystemDescriptor). The resolver feeds it
//! arguments statefully — each dependency's built instance in dependency-list
//! order, then each static argument in its own list order — and finally calls
//! [`build`](SubsystemBuilder::build) once.
//!
//! ## Rules
//! - Builders accumulate injected arguments **statefully**; the resolver's
//!   memoization guarantees `build` is invoked at most once per descriptor,
//!   so re-injection is never observable.
//! - Returning `None` from `build` is the **build failure** signal: the
//!   descriptor's slot records the failure and the subsystem is silently
//!   skipped in every phase. No error is raised.

use std::any::Any;

use crate::core::subsystem::SubsystemRef;

/// Opaque static build argument, downcast by the builder that declared it.
pub type BuildArg = Box<dyn Any + Send + Sync>;

/// Stateful factory for one subsystem.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use subvisor::{BuildArg, Subsystem, SubsystemBuilder, SubsystemRef};
///
/// struct Recorder { out_path: String }
///
/// #[async_trait]
/// impl Subsystem for Recorder {
///     fn name(&self) -> &str { "recorder" }
/// }
///
/// #[derive(Default)]
/// struct RecorderBuilder { out_path: Option<String> }
///
/// impl SubsystemBuilder for RecorderBuilder {
///     fn with_arg(&mut self, arg: BuildArg) {
///         if let Ok(path) = arg.downcast::<String>() {
///             self.out_path = Some(*path);
///         }
///     }
///
///     fn build(&mut self) -> Option<SubsystemRef> {
///         let out_path = self.out_path.take()?;
///         Some(std::sync::Arc::new(Recorder { out_path }))
///     }
/// }
/// ```
pub trait SubsystemBuilder: Send + Sync {
    /// Receives one dependency's built instance, in dependency-list order.
    ///
    /// A dependency whose own build failed is never delivered; a builder
    /// missing a required dependency should return `None` from `build`.
    fn with_dependency(&mut self, _dep: SubsystemRef) {}

    /// Receives one static argument, in static-argument-list order.
    fn with_arg(&mut self, _arg: BuildArg) {}

    /// Terminal operation: produces the subsystem, or `None` on build failure.
    fn build(&mut self) -> Option<SubsystemRef>;
}
