//! # Capture pipeline: store-fill producer plus barrier-synchronized fan-out.
//!
//! [`CapturePipeline`] is a concrete [`Subsystem`] owning two managed workers:
//!
//! ```text
//! producer loop:                          fan-out loop:
//!   source.capture(process)                 store.latest()
//!     ├─ Some(frame) ─► store.set_latest      ├─ Some(frame) ─► publisher.publish(frame, changed)
//!     └─ None ─► retry next iteration         │     changed = handle differs from last published
//!        (no backoff, no store action)        └─ None ─► retry next iteration
//! ```
//!
//! ## Rules
//! - Source unavailability is a steady-state condition, not an error: the
//!   producer retries forever with no backoff and stores nothing meanwhile.
//!   `CaptureAcquired`/`CaptureLost` events mark the transitions only.
//! - The fan-out loop publishes **unconditionally** whenever a frame is
//!   available, even when unchanged: sinks get a steady heartbeat plus a
//!   change signal (frame identity, not pixel comparison).
//! - `inject(TargetProcessChanged)` retargets the producer without a restart
//!   (late-bound dependency delivery).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::capture::frame::{CaptureFrame, FrameRef};
use crate::capture::publisher::FramePublisher;
use crate::capture::sink::FrameSink;
use crate::capture::source::CaptureSource;
use crate::capture::store::FrameStore;
use crate::config::Config;
use crate::core::{
    BuildArg, InjectEvent, Subsystem, SubsystemBuilder, SubsystemRef, SubsystemState,
};
use crate::events::{Bus, Event, EventKind};
use crate::runtime::Worker;

const PIPELINE_NAME: &str = "capture";

/// Frame-capture subsystem: one producer worker filling the store, one
/// fan-out worker publishing to all sinks under the barrier.
pub struct CapturePipeline {
    source: Arc<dyn CaptureSource>,
    process: Arc<Mutex<Arc<str>>>,
    store: Arc<FrameStore>,
    publisher: Arc<FramePublisher>,
    producer: Worker<()>,
    fanout: Worker<()>,
    poll: Duration,
    bus: Bus,
}

impl CapturePipeline {
    /// Creates the pipeline; workers are spawned by [`Subsystem::start`].
    pub fn new(
        source: Arc<dyn CaptureSource>,
        process: impl Into<Arc<str>>,
        sinks: Vec<Arc<dyn FrameSink>>,
        cfg: &Config,
        bus: Bus,
    ) -> Self {
        Self {
            source,
            process: Arc::new(Mutex::new(process.into())),
            store: Arc::new(FrameStore::new()),
            publisher: Arc::new(FramePublisher::new(sinks, bus.clone())),
            producer: Worker::new(format!("{PIPELINE_NAME}/producer"), bus.clone()),
            fanout: Worker::new(format!("{PIPELINE_NAME}/publisher"), bus.clone()),
            poll: cfg.capture_poll,
            bus,
        }
    }

    /// The latest-wins frame store, for external consumers that need the
    /// current frame without joining the publish barrier.
    pub fn store(&self) -> Arc<FrameStore> {
        self.store.clone()
    }

    /// Current capture target process name.
    pub fn process(&self) -> Arc<str> {
        self.process.lock().unwrap().clone()
    }

    /// Stops both workers cooperatively and joins them within `grace`,
    /// then shuts down the sink workers. Returns whether both loop
    /// terminations were observed in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.producer.stop();
        self.fanout.stop();
        let producer_done = self.producer.join(grace).await;
        let fanout_done = self.fanout.join(grace).await;
        self.publisher.shutdown().await;
        producer_done && fanout_done
    }

    fn spawn_producer(&self) {
        let source = self.source.clone();
        let process = self.process.clone();
        let store = self.store.clone();
        let bus = self.bus.clone();
        let poll = self.poll;

        self.producer.start(move |flag| async move {
            let mut available = false;
            while flag.is_running() {
                let target = process.lock().unwrap().clone();
                match source.capture(&target).await {
                    Some(frame) => {
                        if !available {
                            available = true;
                            bus.publish(
                                Event::now(EventKind::CaptureAcquired)
                                    .with_subsystem(PIPELINE_NAME)
                                    .with_reason(target.clone()),
                            );
                        }
                        store.set_latest(Arc::new(frame));
                    }
                    None => {
                        if available {
                            available = false;
                            bus.publish(
                                Event::now(EventKind::CaptureLost)
                                    .with_subsystem(PIPELINE_NAME)
                                    .with_reason(target.clone()),
                            );
                        }
                    }
                }
                flag.pace(poll).await;
            }
        });
    }

    fn spawn_fanout(&self) {
        let store = self.store.clone();
        let publisher = self.publisher.clone();
        let poll = self.poll;

        self.fanout.start(move |flag| async move {
            let mut last: Option<FrameRef> = None;
            while flag.is_running() {
                if let Some(frame) = store.latest() {
                    let changed = last
                        .as_ref()
                        .map_or(true, |prev| !CaptureFrame::same_capture(prev, &frame));
                    publisher.publish(frame.clone(), changed).await;
                    last = Some(frame);
                }
                flag.pace(poll).await;
            }
        });
    }
}

#[async_trait]
impl Subsystem for CapturePipeline {
    fn name(&self) -> &str {
        PIPELINE_NAME
    }

    async fn start(&self) {
        self.spawn_producer();
        self.spawn_fanout();
    }

    async fn inject(&self, event: &InjectEvent) {
        if let InjectEvent::TargetProcessChanged { process } = event {
            *self.process.lock().unwrap() = process.clone();
        }
    }

    fn state(&self) -> Option<SubsystemState> {
        if !self.producer.is_started() {
            Some(SubsystemState::Built)
        } else if self.producer.is_running() || self.fanout.is_running() {
            Some(SubsystemState::Started)
        } else {
            Some(SubsystemState::Stopped)
        }
    }
}

/// Builder wiring the pipeline into a descriptor set.
///
/// Typed collaborators (source, sinks) are supplied at construction; a
/// `String` static argument overrides the target process name, which lets
/// profiles retarget the pipeline without touching code.
pub struct CapturePipelineBuilder {
    source: Option<Arc<dyn CaptureSource>>,
    sinks: Vec<Arc<dyn FrameSink>>,
    process: Arc<str>,
    cfg: Config,
    bus: Bus,
}

impl CapturePipelineBuilder {
    /// Creates a builder with the given collaborators and default process.
    pub fn new(
        source: Arc<dyn CaptureSource>,
        sinks: Vec<Arc<dyn FrameSink>>,
        process: impl Into<Arc<str>>,
        cfg: &Config,
        bus: Bus,
    ) -> Box<Self> {
        Box::new(Self {
            source: Some(source),
            sinks,
            process: process.into(),
            cfg: cfg.clone(),
            bus,
        })
    }
}

impl SubsystemBuilder for CapturePipelineBuilder {
    fn with_arg(&mut self, arg: BuildArg) {
        if let Ok(process) = arg.downcast::<String>() {
            self.process = Arc::from(process.as_str());
        }
    }

    fn build(&mut self) -> Option<SubsystemRef> {
        let source = self.source.take()?;
        Some(Arc::new(CapturePipeline::new(
            source,
            self.process.clone(),
            std::mem::take(&mut self.sinks),
            &self.cfg,
            self.bus.clone(),
        )))
    }
}
