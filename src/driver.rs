//! Frame loop that wires the pose source, the rep counter, the session
//! stats and the audit sink together.
//!
//! Stopping is the caller's business: the loop ends when the source runs
//! dry, when the stop flag is raised, or when the optional deadline passes.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{Config, PoseConfig};
use crate::error::SourceError;
use crate::geometry::elapsed;
use crate::landmarks::KeypointSample;
use crate::overlay::Overlay;
use crate::rep_counter::{RepCounter, RepEvent};
use crate::session::{SessionHandle, SessionReport};
use crate::sink::RepEventSink;
use crate::source::{PoseFrame, PoseSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Stopped,
    Deadline,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub report: SessionReport,
    pub frames: u64,
    pub tracked_frames: u64,
    pub skipped_frames: u64,
    pub sink_failures: u64,
    pub stop: StopReason,
}

pub struct SessionDriver<S> {
    counter: RepCounter,
    session: SessionHandle,
    sink: S,
    overlay: Overlay,
    pose: PoseConfig,
    deadline_secs: Option<f64>,
    frames: u64,
    tracked_frames: u64,
    skipped_frames: u64,
    sink_failures: u64,
}

impl<S: RepEventSink> SessionDriver<S> {
    pub fn new(config: &Config, session: SessionHandle, sink: S) -> Self {
        Self {
            counter: RepCounter::new(config.thresholds),
            session,
            sink,
            overlay: Overlay::new(),
            pose: config.pose.clone(),
            deadline_secs: config.session.deadline_secs(),
            frames: 0,
            tracked_frames: 0,
            skipped_frames: 0,
            sink_failures: 0,
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start a fresh session: counters, reasons and the state machine are cleared.
    pub fn restart(&mut self) {
        self.counter.reset();
        self.session.reset();
        self.overlay = Overlay::new();
        self.frames = 0;
        self.tracked_frames = 0;
        self.skipped_frames = 0;
        self.sink_failures = 0;
        info!("Session restarted");
    }

    /// Classify a single frame captured at `timestamp`.
    pub fn step(&mut self, frame: &PoseFrame, timestamp: f64) -> Option<RepEvent> {
        self.frames += 1;

        let sample = frame.landmarks.as_deref().and_then(|landmarks| {
            KeypointSample::from_landmarks(
                landmarks,
                self.pose.side,
                self.pose.min_visibility,
                timestamp,
            )
        });
        if sample.is_some() {
            self.tracked_frames += 1;
        }

        let outcome = self.counter.process(sample.as_ref())?;
        if let Some(event) = &outcome.event {
            self.session.record(event);
            info!(
                rep = event.rep_index,
                t = event.timestamp,
                correct = event.correct,
                reasons = ?event.failure_reasons,
                "Rep completed"
            );
            if let Err(err) = self.sink.record(event) {
                self.sink_failures += 1;
                warn!(rep = event.rep_index, error = %err, "Failed to log rep event");
            }
        }

        self.overlay.update(&outcome, self.session.correct_reps());
        for line in self.overlay.lines() {
            debug!(target: "form_sentinel::overlay", "{line}");
        }

        outcome.event
    }

    /// Drive frames from `source` until it ends, `stop` is raised, or the deadline passes.
    pub fn run<P, C>(
        &mut self,
        source: &mut P,
        clock: &C,
        stop: &AtomicBool,
    ) -> Result<SessionSummary, SourceError>
    where
        P: PoseSource + ?Sized,
        C: Clock + ?Sized,
    {
        info!(deadline_secs = ?self.deadline_secs, side = ?self.pose.side, "Session started");
        let mut started_at: Option<f64> = None;

        let reason = loop {
            if stop.load(Ordering::Relaxed) {
                break StopReason::Stopped;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(SourceError::Malformed { line, source: error }) => {
                    self.skipped_frames += 1;
                    warn!(line, %error, "Skipping malformed pose frame");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let timestamp = frame.timestamp.unwrap_or_else(|| clock.now_secs());
            let start = *started_at.get_or_insert(timestamp);
            self.step(&frame, timestamp);

            if let Some(deadline) = self.deadline_secs {
                if elapsed(start, timestamp) > deadline {
                    break StopReason::Deadline;
                }
            }
        };

        let summary = SessionSummary {
            report: self.session.report(),
            frames: self.frames,
            tracked_frames: self.tracked_frames,
            skipped_frames: self.skipped_frames,
            sink_failures: self.sink_failures,
            stop: reason,
        };
        info!(
            stop = ?summary.stop,
            frames = summary.frames,
            total = summary.report.total_reps,
            correct = summary.report.correct_reps,
            incorrect = summary.report.incorrect_reps,
            "Session finished"
        );
        Ok(summary)
    }
}
