//! # Cooperative running flag.
//!
//! [`RunFlag`] is the cancellation signal passed into every managed loop
//! body. It pairs a plain boolean (checked once per iteration, at the top)
//! with a [`CancellationToken`] so blocking waits inside the loop can be
//! made cancellable with `select!`.
//!
//! ## Rules
//! - The flag is **one-shot**: `set(false)` cancels the token and the flag
//!   never goes back to running. A finished worker is not restartable.
//! - In-flight blocking operations are **not** interrupted; the loop observes
//!   the flag at its next iteration boundary (best-effort cancellation).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

struct FlagInner {
    running: AtomicBool,
    token: CancellationToken,
}

/// Shared cooperative cancellation signal for one worker loop.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct RunFlag {
    inner: Arc<FlagInner>,
}

impl RunFlag {
    /// Creates a new flag in the not-running state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FlagInner {
                running: AtomicBool::new(false),
                token: CancellationToken::new(),
            }),
        }
    }

    /// Returns whether the loop should keep running.
    #[inline]
    pub fn get(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Alias for [`get`](Self::get), reads better at loop heads.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.get()
    }

    /// Sets the running state.
    ///
    /// `set(false)` also cancels the token so cancellable waits wake up.
    /// The stop is one-shot: a later `set(true)` has no effect on an already
    /// cancelled token and is rejected.
    pub fn set(&self, running: bool) {
        if running {
            if !self.inner.token.is_cancelled() {
                self.inner.running.store(true, Ordering::Release);
            }
        } else {
            self.inner.running.store(false, Ordering::Release);
            self.inner.token.cancel();
        }
    }

    /// Completes when the flag is stopped. Use inside `select!` to make
    /// sleeps and waits cancellable.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await;
    }

    /// The underlying cancellation token, for APIs that take one directly.
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Paces one loop iteration: yields to the scheduler when `interval` is
    /// zero, otherwise sleeps cancellably for `interval`.
    pub async fn pace(&self, interval: std::time::Duration) {
        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.cancelled() => {}
            }
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let flag = RunFlag::new();
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
        flag.set(false);
        assert!(!flag.get());
    }

    #[test]
    fn test_stop_is_one_shot() {
        let flag = RunFlag::new();
        flag.set(true);
        flag.set(false);
        flag.set(true);
        assert!(!flag.is_running(), "stopped flag must not restart");
        assert!(flag.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_on_stop() {
        let flag = RunFlag::new();
        flag.set(true);
        let waiter = flag.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        flag.set(false);
        handle.await.unwrap();
    }
}
