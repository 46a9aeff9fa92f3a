//! # Managed worker: a named background loop with start/stop/join lifecycle.
//!
//! [`Worker`] wraps one long-lived loop body bound to a [`RunFlag`]:
//! - `start(body)`: start-once; a second call is a no-op
//! - `stop()`: cooperative, observed at the body's next iteration boundary
//! - `join(timeout)`: wait for termination, report whether it was observed
//! - `take_result()`: optional result accessor after a successful join
//!
//! ## State machine
//! ```text
//! NotStarted ──start()──► Running ──stop()/body returns──► Terminated
//! ```
//! There is no transition back to `NotStarted`: a terminated worker cannot be
//! restarted (`start` returns false).
//!
//! ## Rules
//! - The body receives a [`RunFlag`] clone and must check it once per
//!   iteration; blocking calls inside an iteration are not preempted.
//! - `WorkerStarted` / `WorkerStopped` events are published to the bus.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};
use crate::runtime::RunFlag;

/// Named background worker with cooperative cancellation.
///
/// `T` is the loop body's result type, retrievable via
/// [`take_result`](Self::take_result) after a successful join. Use `()` for
/// pure loops.
pub struct Worker<T> {
    name: std::sync::Arc<str>,
    flag: RunFlag,
    started: AtomicBool,
    handle: Mutex<Option<JoinHandle<T>>>,
    result: Mutex<Option<T>>,
    bus: Bus,
}

impl<T: Send + 'static> Worker<T> {
    /// Creates a new worker in the not-started state.
    pub fn new(name: impl Into<std::sync::Arc<str>>, bus: Bus) -> Self {
        Self {
            name: name.into(),
            flag: RunFlag::new(),
            started: AtomicBool::new(false),
            handle: Mutex::new(None),
            result: Mutex::new(None),
            bus,
        }
    }

    /// Starts the worker with the given loop body.
    ///
    /// Returns `true` if the worker was started by this call, `false` if it
    /// was already started (idempotent no-op). The body receives a clone of
    /// the worker's [`RunFlag`] and should exit promptly once it reads false.
    pub fn start<F, Fut>(&self, body: F) -> bool
    where
        F: FnOnce(RunFlag) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.flag.set(true);
        self.bus
            .publish(Event::now(EventKind::WorkerStarted).with_worker(self.name.clone()));

        let flag = self.flag.clone();
        let bus = self.bus.clone();
        let name = self.name.clone();
        let fut = body(self.flag.clone());
        let handle = tokio::spawn(async move {
            let out = fut.await;
            flag.set(false);
            bus.publish(Event::now(EventKind::WorkerStopped).with_worker(name));
            out
        });

        *self.handle.lock().unwrap() = Some(handle);
        true
    }

    /// Requests a cooperative stop.
    ///
    /// The loop observes this at its next iteration boundary; any blocking
    /// call in flight runs to completion first.
    pub fn stop(&self) {
        self.flag.set(false);
    }

    /// Waits until the worker terminates or the timeout elapses.
    ///
    /// Returns `true` if termination was observed (including a worker that
    /// was never started), `false` on timeout. On success the body's result
    /// becomes available via [`take_result`](Self::take_result).
    ///
    /// Intended for a single joining caller; a second concurrent `join`
    /// observes the handle as already consumed and returns `true`.
    pub async fn join(&self, timeout: Duration) -> bool {
        let taken = self.handle.lock().unwrap().take();
        let Some(mut handle) = taken else {
            return true;
        };

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(value)) => {
                *self.result.lock().unwrap() = Some(value);
                true
            }
            // Body panicked; the task is finished either way.
            Ok(Err(_join_err)) => true,
            Err(_elapsed) => {
                *self.handle.lock().unwrap() = Some(handle);
                false
            }
        }
    }

    /// Takes the loop body's result, if a join has completed successfully.
    pub fn take_result(&self) -> Option<T> {
        self.result.lock().unwrap().take()
    }

    /// Returns whether the loop is currently running.
    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// Returns whether `start` has ever been called.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// The worker's run flag, for wiring into `select!`-based waits.
    pub fn flag(&self) -> &RunFlag {
        &self.flag
    }

    /// The worker's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    fn bus() -> Bus {
        Bus::new(64)
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let worker: Worker<()> = Worker::new("w", bus());
        assert!(worker.start(|flag| async move {
            while flag.is_running() {
                tokio::task::yield_now().await;
            }
        }));
        assert!(!worker.start(|_flag| async move {}), "second start must no-op");
        worker.stop();
        assert!(worker.join(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_join_times_out_while_body_blocked() {
        let worker: Worker<()> = Worker::new("stuck", bus());
        worker.start(|flag| async move {
            // Blocks until cancelled; the first join below must time out.
            flag.cancelled().await;
        });
        assert!(!worker.join(Duration::from_millis(20)).await);
        worker.stop();
        assert!(worker.join(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_result_available_after_join() {
        let worker: Worker<u64> = Worker::new("sum", bus());
        worker.start(|_flag| async move { 41 + 1 });
        assert!(worker.join(Duration::from_secs(1)).await);
        assert_eq!(worker.take_result(), Some(42));
        assert_eq!(worker.take_result(), None);
    }

    #[tokio::test]
    async fn test_no_restart_after_termination() {
        let worker: Worker<()> = Worker::new("once", bus());
        worker.start(|_flag| async move {});
        assert!(worker.join(Duration::from_secs(1)).await);
        let ran = Arc::new(AtomicU32::new(0));
        let ran2 = ran.clone();
        assert!(!worker.start(move |_flag| async move {
            ran2.fetch_add(1, Ordering::SeqCst);
        }));
        tokio::task::yield_now().await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_join_never_started_observes_termination() {
        let worker: Worker<()> = Worker::new("idle", bus());
        assert!(worker.join(Duration::from_millis(1)).await);
    }
}
