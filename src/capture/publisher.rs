//! # Barrier-synchronized frame fan-out.
//!
//! [`FramePublisher`] fans one frame out to all registered sinks and blocks
//! until every sink has finished processing it.
//!
//! ## Architecture
//! ```text
//! publish(frame, changed)
//!     │ barrier.reset(N)
//!     ├──► [slot 1] ─ permit ─► worker 1 ──► sink1.process_frame() ─► barrier.signal()
//!     ├──► [slot 2] ─ permit ─► worker 2 ──► sink2.process_frame() ─► barrier.signal()
//!     └──► [slot N] ─ permit ─► worker N ──► sinkN.process_frame() ─► barrier.signal()
//!     ▼
//! barrier.wait()   (returns after exactly N signals)
//! ```
//!
//! ## Rules
//! - **Synchronous fan-out, not a queue**: the publisher never starts a new
//!   cycle before all sinks finished the previous one. Throughput is traded
//!   for an at-most-one-frame-in-flight-per-sink invariant, bounding memory
//!   to one frame handle per sink.
//! - Each sink's slot is written only by the publisher and read only by that
//!   sink's own worker; the barrier serializes the two sides.
//! - A panicking sink still signals the barrier (the worker signals on its
//!   behalf) and the panic is reported as a `SinkPanicked` event; otherwise
//!   one bad sink would deadlock the whole pipeline.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::capture::barrier::CountdownBarrier;
use crate::capture::frame::FrameRef;
use crate::capture::sink::FrameSink;
use crate::events::{Bus, Event};

/// Per-sink delivery state: one pending slot gated by a counting semaphore.
struct SinkChannel {
    name: &'static str,
    pending: Mutex<Option<(FrameRef, bool)>>,
    gate: Semaphore,
}

/// Fan-out coordinator for multiple frame sinks.
pub struct FramePublisher {
    channels: Vec<Arc<SinkChannel>>,
    // Drained by shutdown.
    workers: Mutex<Vec<JoinHandle<()>>>,
    // Shared with every worker, which signals it once per cycle permit.
    barrier: Arc<CountdownBarrier>,
    bus: Bus,
}

impl FramePublisher {
    /// Creates a publisher and spawns one worker per sink.
    ///
    /// Workers run until [`shutdown`](Self::shutdown) closes their gates.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn FrameSink>>, bus: Bus) -> Self {
        let barrier = Arc::new(CountdownBarrier::new());
        let mut channels = Vec::with_capacity(sinks.len());
        let mut workers = Vec::with_capacity(sinks.len());

        for sink in sinks {
            let channel = Arc::new(SinkChannel {
                name: sink.name(),
                pending: Mutex::new(None),
                gate: Semaphore::new(0),
            });
            channels.push(channel.clone());

            let worker_barrier = barrier.clone();
            let worker_bus = bus.clone();
            let handle = tokio::spawn(async move {
                loop {
                    match channel.gate.acquire().await {
                        Ok(permit) => permit.forget(),
                        // Gate closed: publisher shutdown.
                        Err(_closed) => break,
                    }

                    let delivered = channel.pending.lock().unwrap().take();
                    if let Some((frame, changed)) = delivered {
                        let fut = sink.process_frame(&frame, changed);
                        if let Err(panic_err) =
                            std::panic::AssertUnwindSafe(fut).catch_unwind().await
                        {
                            let info = {
                                let any = &*panic_err;
                                if let Some(msg) = any.downcast_ref::<&'static str>() {
                                    (*msg).to_string()
                                } else if let Some(msg) = any.downcast_ref::<String>() {
                                    msg.clone()
                                } else {
                                    "unknown panic".to_string()
                                }
                            };
                            worker_bus.publish(Event::sink_panicked(channel.name, info));
                        }
                    }

                    // Exactly one signal per permit, panic or not.
                    worker_barrier.signal();
                }
            });
            workers.push(handle);
        }

        Self {
            channels,
            workers: Mutex::new(workers),
            barrier,
            bus,
        }
    }

    /// Delivers `frame` to every sink and blocks until each has signalled
    /// completion exactly once for this cycle.
    ///
    /// With zero sinks the call returns immediately.
    pub async fn publish(&self, frame: FrameRef, changed: bool) {
        self.barrier.reset(self.channels.len());
        for channel in &self.channels {
            *channel.pending.lock().unwrap() = Some((frame.clone(), changed));
            channel.gate.add_permits(1);
        }
        self.barrier.wait().await;
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.channels.len()
    }

    /// Gracefully shuts down all sink workers.
    ///
    /// 1. Closes every gate (workers observe the closed semaphore)
    /// 2. Awaits all worker tasks to finish
    ///
    /// Idempotent: a second call finds no workers left to join.
    pub async fn shutdown(&self) {
        for channel in &self.channels {
            channel.gate.close();
        }
        let drained: Vec<JoinHandle<()>> = self.workers.lock().unwrap().drain(..).collect();
        for handle in drained {
            let _ = handle.await;
        }
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::CaptureFrame;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn frame() -> FrameRef {
        Arc::new(CaptureFrame::new(4, 4, vec![0u8; 64]))
    }

    fn bus() -> Bus {
        Bus::new(64)
    }

    struct CountingSink {
        completions: Arc<AtomicUsize>,
        last_changed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FrameSink for CountingSink {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn process_frame(&self, _frame: &FrameRef, changed: bool) {
            self.last_changed.store(changed, Ordering::SeqCst);
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Sink that blocks until the test releases it, then marks processed.
    struct GatedSink {
        release: Arc<Notify>,
        processed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FrameSink for GatedSink {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn process_frame(&self, _frame: &FrameRef, _changed: bool) {
            self.release.notified().await;
            self.processed.store(true, Ordering::SeqCst);
        }
    }

    struct PanickingSink;

    #[async_trait]
    impl FrameSink for PanickingSink {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn process_frame(&self, _frame: &FrameRef, _changed: bool) {
            panic!("sink exploded");
        }
    }

    #[tokio::test]
    async fn test_publish_with_zero_sinks_returns_immediately() {
        let publisher = FramePublisher::new(Vec::new(), bus());
        assert_eq!(publisher.sink_count(), 0);
        publisher.publish(frame(), true).await;
        publisher.shutdown().await;
    }

    #[tokio::test]
    async fn test_publish_blocks_until_sink_processed() {
        let release = Arc::new(Notify::new());
        let processed = Arc::new(AtomicBool::new(false));
        let sink: Arc<dyn FrameSink> = Arc::new(GatedSink {
            release: release.clone(),
            processed: processed.clone(),
        });
        let publisher = Arc::new(FramePublisher::new(vec![sink], bus()));

        let pub_clone = publisher.clone();
        let publishing = tokio::spawn(async move { pub_clone.publish(frame(), true).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!publishing.is_finished(), "publish must block on the barrier");
        assert!(!processed.load(Ordering::SeqCst));

        release.notify_one();
        tokio::time::timeout(Duration::from_secs(1), publishing)
            .await
            .expect("publish returned after completion")
            .unwrap();
        assert!(
            processed.load(Ordering::SeqCst),
            "publish returned only after process_frame ran"
        );
    }

    #[tokio::test]
    async fn test_publish_waits_for_every_sink() {
        let completions = Arc::new(AtomicUsize::new(0));
        let sinks: Vec<Arc<dyn FrameSink>> = (0..4)
            .map(|_| {
                Arc::new(CountingSink {
                    completions: completions.clone(),
                    last_changed: Arc::new(AtomicBool::new(false)),
                }) as Arc<dyn FrameSink>
            })
            .collect();
        let publisher = FramePublisher::new(sinks, bus());

        publisher.publish(frame(), true).await;
        assert_eq!(completions.load(Ordering::SeqCst), 4);

        // Barrier resets cleanly: a second cycle completes the same way.
        publisher.publish(frame(), false).await;
        assert_eq!(completions.load(Ordering::SeqCst), 8);
        publisher.shutdown().await;
    }

    #[tokio::test]
    async fn test_changed_flag_reaches_sink() {
        let completions = Arc::new(AtomicUsize::new(0));
        let last_changed = Arc::new(AtomicBool::new(false));
        let sink: Arc<dyn FrameSink> = Arc::new(CountingSink {
            completions: completions.clone(),
            last_changed: last_changed.clone(),
        });
        let publisher = FramePublisher::new(vec![sink], bus());

        publisher.publish(frame(), true).await;
        assert!(last_changed.load(Ordering::SeqCst));
        publisher.publish(frame(), false).await;
        assert!(!last_changed.load(Ordering::SeqCst));
        publisher.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_sink_does_not_deadlock_cycle() {
        let bus = bus();
        let mut rx = bus.subscribe();
        let sink: Arc<dyn FrameSink> = Arc::new(PanickingSink);
        let publisher = FramePublisher::new(vec![sink], bus);

        tokio::time::timeout(Duration::from_secs(1), publisher.publish(frame(), true))
            .await
            .expect("publish completes despite sink panic");

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SinkPanicked);
        assert_eq!(ev.subsystem.as_deref(), Some("panicking"));
        assert_eq!(ev.reason.as_deref(), Some("sink exploded"));

        // The worker survives the panic and serves the next cycle.
        tokio::time::timeout(Duration::from_secs(1), publisher.publish(frame(), false))
            .await
            .expect("second cycle still completes");
        publisher.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_joins_workers() {
        let completions = Arc::new(AtomicUsize::new(0));
        let sink: Arc<dyn FrameSink> = Arc::new(CountingSink {
            completions: completions.clone(),
            last_changed: Arc::new(AtomicBool::new(false)),
        });
        let publisher = FramePublisher::new(vec![sink], bus());
        publisher.publish(frame(), true).await;
        publisher.shutdown().await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }
}
