//! # Orchestrator driver: the managed loop that runs the three phases.
//!
//! [`OrchestratorDriver`] hosts an [`Orchestrator`] on a managed worker:
//! `initialize()` then `start()` exactly once, flip the ready flag, then loop
//! `update()` while the run flag holds.
//!
//! ## State machine
//! ```text
//! NotStarted ──start()──► Initializing ──► Started(ready=true)
//!                                             │
//!                                             ▼
//!                                       Updating (loop)
//!                                             │ flag false at iteration top
//!                                             ▼
//!                                         Terminated
//! ```
//!
//! ## Rules
//! - `update()` is never observed before `start()` completes.
//! - Cancellation is cooperative: the flag is checked at the top of each
//!   cycle; a blocking call inside `update()` is not preempted.
//! - `run_until_shutdown` wires the driver to OS termination signals and a
//!   configurable grace period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::Config;
use crate::core::orchestrator::Orchestrator;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::runtime::{Worker, shutdown};

const DRIVER_NAME: &str = "orchestrator";

/// Managed worker driving Initialize/Start once, then Update in a loop.
pub struct OrchestratorDriver {
    orchestrator: Arc<Orchestrator>,
    worker: Worker<()>,
    ready: Arc<AtomicBool>,
    tick: Duration,
    grace: Duration,
    bus: Bus,
}

impl OrchestratorDriver {
    /// Creates a driver for the given orchestrator.
    pub fn new(orchestrator: Arc<Orchestrator>, cfg: &Config) -> Self {
        let bus = orchestrator.bus().clone();
        Self {
            orchestrator,
            worker: Worker::new(DRIVER_NAME, bus.clone()),
            ready: Arc::new(AtomicBool::new(false)),
            tick: cfg.update_tick,
            grace: cfg.grace,
            bus,
        }
    }

    /// Starts the driver loop. Idempotent: returns `false` if already started.
    pub fn start(&self) -> bool {
        let orchestrator = self.orchestrator.clone();
        let ready = self.ready.clone();
        let bus = self.bus.clone();
        let tick = self.tick;

        self.worker.start(move |flag| async move {
            orchestrator.initialize().await;
            orchestrator.start().await;
            ready.store(true, Ordering::Release);
            bus.publish(Event::now(EventKind::OrchestratorReady).with_worker(DRIVER_NAME));

            while flag.is_running() {
                orchestrator.update().await;
                flag.pace(tick).await;
            }
        })
    }

    /// Requests a cooperative stop of the update loop.
    pub fn stop(&self) {
        self.worker.stop();
    }

    /// Waits for the loop to terminate; `true` if termination was observed
    /// within the timeout.
    pub async fn join(&self, timeout: Duration) -> bool {
        self.worker.join(timeout).await
    }

    /// Whether `initialize` + `start` have completed and the update loop is
    /// (or was) running.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether the update loop is currently running.
    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// The hosted orchestrator, for `inject` and subsystem lookups.
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Runs until an OS termination signal arrives, then stops cooperatively.
    ///
    /// Publishes `ShutdownRequested` on signal, then waits up to the
    /// configured grace for the loop to reach an iteration boundary:
    /// `StoppedWithinGrace` on success, `GraceExceeded` (and an error) if the
    /// loop is still inside a blocking call.
    pub async fn run_until_shutdown(&self) -> Result<(), RuntimeError> {
        self.start();

        let _ = shutdown::wait_for_shutdown_signal().await;
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.stop();

        if self.join(self.grace).await {
            self.bus
                .publish(Event::now(EventKind::StoppedWithinGrace).with_worker(DRIVER_NAME));
            Ok(())
        } else {
            self.bus
                .publish(Event::now(EventKind::GraceExceeded).with_worker(DRIVER_NAME));
            Err(RuntimeError::GraceExceeded {
                grace: self.grace,
                worker: DRIVER_NAME.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::SubsystemBuilder;
    use crate::core::subsystem::{Subsystem, SubsystemRef};
    use crate::SubsystemDescriptor;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Phases {
        journal: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Subsystem for Phases {
        fn name(&self) -> &str {
            "phases"
        }

        async fn initialize(&self) {
            self.journal.lock().unwrap().push("initialize");
        }

        async fn start(&self) {
            self.journal.lock().unwrap().push("start");
        }

        async fn update(&self) {
            self.journal.lock().unwrap().push("update");
        }
    }

    struct PhasesBuilder {
        journal: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SubsystemBuilder for PhasesBuilder {
        fn build(&mut self) -> Option<SubsystemRef> {
            Some(Arc::new(Phases {
                journal: self.journal.clone(),
            }))
        }
    }

    fn driver_with_journal() -> (OrchestratorDriver, Arc<Mutex<Vec<&'static str>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let desc = SubsystemDescriptor::new(
            "phases",
            Box::new(PhasesBuilder {
                journal: journal.clone(),
            }),
        )
        .arc();
        let cfg = Config::default();
        let orch =
            Arc::new(Orchestrator::new(vec![desc], Bus::new(cfg.bus_capacity_clamped())).unwrap());
        (OrchestratorDriver::new(orch, &cfg), journal)
    }

    async fn wait_ready(driver: &OrchestratorDriver) {
        while !driver.is_ready() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_update_never_precedes_start_completion() {
        let (driver, journal) = driver_with_journal();
        assert!(driver.start());
        wait_ready(&driver).await;

        // Let a few update cycles run.
        tokio::time::sleep(Duration::from_millis(10)).await;
        driver.stop();
        assert!(driver.join(Duration::from_secs(1)).await);

        let log = journal.lock().unwrap().clone();
        assert!(log.len() >= 2, "at least initialize and start: {log:?}");
        assert_eq!(log[0], "initialize");
        assert_eq!(log[1], "start");
        assert!(log[2..].iter().all(|p| *p == "update"));
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (driver, _journal) = driver_with_journal();
        assert!(driver.start());
        assert!(!driver.start());
        driver.stop();
        assert!(driver.join(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_ready_flag_false_until_started() {
        let (driver, _journal) = driver_with_journal();
        assert!(!driver.is_ready());
        driver.start();
        wait_ready(&driver).await;
        assert!(driver.is_ready());
        driver.stop();
        assert!(driver.join(Duration::from_secs(1)).await);
        // Ready stays true after termination; there is no reset transition.
        assert!(driver.is_ready());
        assert!(!driver.is_running());
    }
}
