//! # Event system: classification, metadata, and broadcast delivery.
//!
//! - [`Event`] / [`EventKind`]: runtime events with monotonic sequence numbers.
//! - [`Bus`]: non-blocking broadcast channel shared by all runtime components.

mod bus;
mod event;

#[cfg(feature = "logging")]
mod log;

pub use bus::Bus;
pub use event::{Event, EventKind};

#[cfg(feature = "logging")]
pub use log::LogWriter;
