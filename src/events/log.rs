//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints bus events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [built] subsystem=capture
//! [build-skipped] subsystem=overlay
//! [worker-started] worker=capture/producer
//! [capture-lost] subsystem=capture process="game.exe"
//! [shutdown-requested]
//! ```

use tokio::task::JoinHandle;

use crate::events::{Bus, EventKind};

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use — subscribe to the [`Bus`] directly for
/// structured logging or metrics collection.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes to the bus and spawns a printer task.
    ///
    /// The task runs until the bus is dropped; lagged receivers skip over
    /// missed events silently.
    pub fn spawn(bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                let ev = match rx.recv().await {
                    Ok(ev) => ev,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                match ev.kind {
                    EventKind::SubsystemBuilt => {
                        println!("[built] subsystem={:?}", ev.subsystem);
                    }
                    EventKind::BuildSkipped => {
                        println!("[build-skipped] subsystem={:?}", ev.subsystem);
                    }
                    EventKind::WorkerStarted => {
                        println!("[worker-started] worker={:?}", ev.worker);
                    }
                    EventKind::WorkerStopped => {
                        println!("[worker-stopped] worker={:?}", ev.worker);
                    }
                    EventKind::OrchestratorReady => {
                        println!("[ready] worker={:?}", ev.worker);
                    }
                    EventKind::CaptureAcquired => {
                        println!(
                            "[capture-acquired] subsystem={:?} process={:?}",
                            ev.subsystem, ev.reason
                        );
                    }
                    EventKind::CaptureLost => {
                        println!(
                            "[capture-lost] subsystem={:?} process={:?}",
                            ev.subsystem, ev.reason
                        );
                    }
                    EventKind::SinkPanicked => {
                        println!(
                            "[sink-panicked] sink={:?} info={:?}",
                            ev.subsystem, ev.reason
                        );
                    }
                    EventKind::ShutdownRequested => {
                        println!("[shutdown-requested]");
                    }
                    EventKind::StoppedWithinGrace => {
                        println!("[stopped-within-grace] worker={:?}", ev.worker);
                    }
                    EventKind::GraceExceeded => {
                        println!("[grace-exceeded] worker={:?}", ev.worker);
                    }
                }
            }
        })
    }
}
