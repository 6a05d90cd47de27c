use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use log::{debug, error};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use posewave_domain::round::{
    Classification, FrameSource, PoseClassifier, RoundConfig, RoundEngine, RoundEvent, RoundPhase,
};

use crate::application::dtos::RoundSnapshotDto;

use super::SessionRecorder;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const CAPTURE_INTERVAL: Duration = Duration::from_millis(700);

/// Owns every timer of a running round.
///
/// The engine itself is pure; this controller drives it with a 1-unit tick
/// interval and a frame-capture interval, and guarantees that both are torn
/// down when the round exits. At most one classification request is in
/// flight at a time; a response that arrives after the round was reset or
/// torn down is discarded by the epoch fence plus the engine's own
/// phase/pause re-check.
pub struct RoundController {
    engine: Arc<Mutex<RoundEngine>>,
    classifier: Arc<dyn PoseClassifier>,
    frames: Arc<dyn FrameSource>,
    recorder: Arc<SessionRecorder>,
    tick_interval: Duration,
    capture_interval: Duration,
    in_flight: Arc<AtomicBool>,
    settings_open: Arc<AtomicBool>,
    events_tx: broadcast::Sender<RoundEvent>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RoundController {
    pub fn new(
        config: RoundConfig,
        classifier: Arc<dyn PoseClassifier>,
        frames: Arc<dyn FrameSource>,
        recorder: Arc<SessionRecorder>,
    ) -> Self {
        Self::with_intervals(config, classifier, frames, recorder, TICK_INTERVAL, CAPTURE_INTERVAL)
    }

    pub fn with_intervals(
        config: RoundConfig,
        classifier: Arc<dyn PoseClassifier>,
        frames: Arc<dyn FrameSource>,
        recorder: Arc<SessionRecorder>,
        tick_interval: Duration,
        capture_interval: Duration,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);

        Self {
            engine: Arc::new(Mutex::new(RoundEngine::new(config))),
            classifier,
            frames,
            recorder,
            tick_interval,
            capture_interval,
            in_flight: Arc::new(AtomicBool::new(false)),
            settings_open: Arc::new(AtomicBool::new(false)),
            events_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Arm the engine and start (or restart) both timers. Restarting resets
    /// all counters and fences off every in-flight classification.
    pub fn start(&self) {
        let events = self.engine.lock().expect("engine lock").reset(Utc::now());
        self.emit(&events);
        self.respawn_tasks();
    }

    /// Used on restart as well; identical semantics to `start`.
    pub fn reset(&self) {
        self.start();
    }

    pub fn pause(&self) {
        self.engine.lock().expect("engine lock").pause();
    }

    pub fn resume(&self) {
        self.engine.lock().expect("engine lock").resume();
    }

    /// The settings overlay freezes timers and capture exactly like pause.
    pub fn open_settings(&self) {
        self.settings_open.store(true, Ordering::Release);
        self.pause();
    }

    pub fn close_settings(&self) {
        self.settings_open.store(false, Ordering::Release);
        self.resume();
    }

    /// Tear everything down; no timer fires and no stale response mutates
    /// anything afterwards.
    pub fn shutdown(&self) {
        self.abort_tasks();
        self.engine.lock().expect("engine lock").halt();
    }

    pub fn snapshot(&self) -> RoundSnapshotDto {
        RoundSnapshotDto::from(self.engine.lock().expect("engine lock").state())
    }

    /// Current round epoch; capture it before an async call and pass it to
    /// [`deliver_classification`](Self::deliver_classification).
    pub fn epoch(&self) -> u64 {
        self.engine.lock().expect("engine lock").epoch()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RoundEvent> {
        self.events_tx.subscribe()
    }

    /// Apply a classifier response obtained under `epoch`. A response from
    /// before a reset/teardown is dropped here; the engine re-checks the
    /// live phase and pause flags on top.
    pub fn deliver_classification(&self, epoch: u64, classification: Classification) {
        let events = apply_classification(&self.engine, epoch, classification);
        self.emit(&events);
    }

    fn emit(&self, events: &[RoundEvent]) {
        for event in events {
            let _ = self.events_tx.send(event.clone());
        }
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().expect("tasks lock").drain(..) {
            task.abort();
        }
    }

    fn respawn_tasks(&self) {
        self.abort_tasks();
        let mut tasks = self.tasks.lock().expect("tasks lock");
        tasks.push(self.spawn_tick_task());
        tasks.push(self.spawn_capture_task());
    }

    fn spawn_tick_task(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let recorder = self.recorder.clone();
        let events_tx = self.events_tx.clone();
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let events = engine.lock().expect("engine lock").tick(Utc::now());
                let mut finished = None;
                for event in &events {
                    if let RoundEvent::GameOver { tally } = event {
                        finished = Some(*tally);
                    }
                    let _ = events_tx.send(event.clone());
                }

                if let Some(tally) = finished {
                    if let Err(e) = recorder.record(&tally).await {
                        // Surfaced to the caller through the log; the round
                        // screen offers a retry, nothing retries here
                        error!("Failed to record finished session: {}", e);
                    }
                    break;
                }
            }
        })
    }

    fn spawn_capture_task(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let frames = self.frames.clone();
        let classifier = self.classifier.clone();
        let in_flight = self.in_flight.clone();
        let settings_open = self.settings_open.clone();
        let events_tx = self.events_tx.clone();
        let period = self.capture_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let (phase, allowed, epoch) = {
                    let engine = engine.lock().expect("engine lock");
                    (
                        engine.state().phase(),
                        engine.capture_allowed(Utc::now()),
                        engine.epoch(),
                    )
                };

                if phase == RoundPhase::GameOver {
                    break;
                }
                if !allowed || settings_open.load(Ordering::Acquire) {
                    continue;
                }
                // Skip the frame while the previous one is still being
                // classified
                if in_flight.load(Ordering::Acquire) {
                    continue;
                }

                let frame = match frames.capture_frame().await {
                    Ok(Some(frame)) => frame,
                    Ok(None) => continue, // camera not ready yet
                    Err(e) => {
                        debug!("Frame capture failed, skipping: {}", e);
                        continue;
                    }
                };

                in_flight.store(true, Ordering::Release);

                let classifier = classifier.clone();
                let engine = engine.clone();
                let in_flight = in_flight.clone();
                let events_tx = events_tx.clone();

                tokio::spawn(async move {
                    let result = classifier.classify(&frame).await;
                    in_flight.store(false, Ordering::Release);

                    match result {
                        Ok(classification) => {
                            let events = apply_classification(&engine, epoch, classification);
                            for event in events {
                                let _ = events_tx.send(event);
                            }
                        }
                        // Fail open: an unreliable classifier never ends
                        // the round
                        Err(e) => debug!("Classification failed, skipping frame: {}", e),
                    }
                });
            }
        })
    }
}

impl Drop for RoundController {
    fn drop(&mut self) {
        for task in self.tasks.lock().expect("tasks lock").drain(..) {
            task.abort();
        }
    }
}

fn apply_classification(
    engine: &Arc<Mutex<RoundEngine>>,
    epoch: u64,
    classification: Classification,
) -> Vec<RoundEvent> {
    let mut engine = engine.lock().expect("engine lock");
    if engine.epoch() != epoch {
        return Vec::new();
    }
    engine.classification(
        &classification.pose_class,
        classification.confidence_score,
        Utc::now(),
    )
}
