//! # Managed worker runtime: running flag, background loops, signal handling.
//!
//! - [`RunFlag`]: cooperative cancellation signal checked once per iteration.
//! - [`Worker`]: start-once background loop with join-with-timeout and an
//!   optional result accessor.
//! - [`wait_for_shutdown_signal`]: OS termination signal helper.

mod flag;
pub mod shutdown;
mod worker;

pub use flag::RunFlag;
pub use shutdown::wait_for_shutdown_signal;
pub use worker::Worker;
