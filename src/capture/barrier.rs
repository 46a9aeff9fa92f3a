//! # Resettable countdown barrier.
//!
//! [`CountdownBarrier`] blocks one waiter until N other parties each signal
//! completion. Unlike `tokio::sync::Barrier` it is **resettable**: the
//! publisher resets the count at the start of every publish cycle and reuses
//! the same barrier for the pipeline's whole lifetime.
//!
//! ## Rules
//! - `reset(n)` happens-before any party can observe the new count: the
//!   publisher resets before handing out cycle permits, so a signal can
//!   never race an uninitialized count.
//! - `wait()` on an already-zero barrier returns immediately (the
//!   zero-subscriber publish cycle).
//! - The wakeup path registers interest **before** re-checking the counter,
//!   so a `signal` landing between the check and the await is never lost.

use std::sync::Mutex;

use tokio::sync::Notify;

/// Countdown latch with `reset` / `signal` / `wait`.
pub struct CountdownBarrier {
    remaining: Mutex<usize>,
    notify: Notify,
}

impl CountdownBarrier {
    /// Creates a barrier with a zero count (waiters pass through).
    pub fn new() -> Self {
        Self {
            remaining: Mutex::new(0),
            notify: Notify::new(),
        }
    }

    /// Sets the number of outstanding signals for the next cycle.
    pub fn reset(&self, count: usize) {
        *self.remaining.lock().unwrap() = count;
        if count == 0 {
            self.notify.notify_waiters();
        }
    }

    /// Records one completion; wakes the waiter when the count reaches zero.
    ///
    /// Extra signals beyond the reset count are ignored (saturating).
    pub fn signal(&self) {
        let mut remaining = self.remaining.lock().unwrap();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            drop(remaining);
            self.notify.notify_waiters();
        }
    }

    /// Blocks until the count reaches zero.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking, otherwise the final signal
            // could slip in between the check and the await.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if *self.remaining.lock().unwrap() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Current outstanding count (diagnostics only).
    pub fn remaining(&self) -> usize {
        *self.remaining.lock().unwrap()
    }
}

impl Default for CountdownBarrier {
    fn default() -> Self {
        Self::new()
    }
}
