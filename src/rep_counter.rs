//! Rep-counting state machine.
//!
//! The elbow angle drives a two-stage cycle with hysteresis:
//! above the extended threshold the arm is `Resting`, below the contracted
//! threshold it is `Contracted`. The Resting -> Contracted edge is the only
//! point where a rep can complete, and each cycle completes at most once.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Thresholds;
use crate::geometry::{elapsed, joint_angle};
use crate::landmarks::KeypointSample;
use crate::rules::{FormReport, RuleChecks, RuleContext};

pub const TOO_FAST_REASON: &str = "You're performing the exercise too quickly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepStage {
    #[default]
    Resting,
    Contracted,
}

impl RepStage {
    /// Label used on the overlay.
    pub fn label(self) -> &'static str {
        match self {
            RepStage::Resting => "down",
            RepStage::Contracted => "up",
        }
    }
}

/// A completed repetition. Emitted once and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepEvent {
    pub timestamp: f64,
    pub rep_index: u32,
    pub correct: bool,
    pub failure_reasons: Vec<String>,
    pub stage: RepStage,
    /// Per-rule snapshot; absent when the rep was rejected for speed
    /// without being evaluated.
    pub checks: Option<RuleChecks>,
}

/// Result of classifying one tracked frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub angle: f32,
    pub stage: RepStage,
    pub form: FormReport,
    pub event: Option<RepEvent>,
}

#[derive(Debug, Clone)]
pub struct RepCounter {
    thresholds: Thresholds,
    stage: RepStage,
    cycle_started: bool,
    cycle_counted: bool,
    rep_start: f64,
    previous_completion: Option<f64>,
    emitted: u32,
}

impl RepCounter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            stage: RepStage::Resting,
            cycle_started: false,
            cycle_counted: false,
            rep_start: 0.0,
            previous_completion: None,
            emitted: 0,
        }
    }

    pub fn stage(&self) -> RepStage {
        self.stage
    }

    pub fn previous_completion(&self) -> Option<f64> {
        self.previous_completion
    }

    /// Number of rep events emitted so far.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    /// Classify one frame. `None` (no body detected) leaves all state untouched.
    pub fn process(&mut self, sample: Option<&KeypointSample>) -> Option<FrameOutcome> {
        let sample = sample?;
        let Some(angle) = joint_angle(sample.shoulder, sample.elbow, sample.wrist) else {
            debug!(t = sample.timestamp, "Degenerate elbow geometry, frame skipped");
            return None;
        };

        let now = sample.timestamp;
        let form = FormReport::evaluate(&RuleContext {
            sample,
            driving_angle: angle,
            previous_completion: self.previous_completion,
            thresholds: &self.thresholds,
        });

        let mut event = None;

        if angle > self.thresholds.extended_angle_deg {
            if self.stage != RepStage::Resting {
                debug!(t = now, angle, "Stage -> Resting");
            }
            self.stage = RepStage::Resting;
            if !self.cycle_started {
                self.rep_start = now;
                self.cycle_started = true;
                self.cycle_counted = false;
            }
        }

        if angle < self.thresholds.contracted_angle_deg && self.stage == RepStage::Resting {
            debug!(t = now, angle, "Stage -> Contracted");
            self.stage = RepStage::Contracted;
            if self.cycle_started {
                event = self.complete_cycle(now, &form);
            }
            self.cycle_started = false;
        }

        Some(FrameOutcome {
            angle,
            stage: self.stage,
            form,
            event,
        })
    }

    fn complete_cycle(&mut self, now: f64, form: &FormReport) -> Option<RepEvent> {
        let rep_duration = elapsed(self.rep_start, now);
        let since_last = self
            .previous_completion
            .map_or(f64::INFINITY, |prev| elapsed(prev, now));

        if rep_duration > self.thresholds.min_rep_duration_secs && !self.cycle_counted {
            self.cycle_counted = true;
            self.previous_completion = Some(now);
            let failure_reasons: Vec<String> = form.failures().map(str::to_owned).collect();
            Some(self.emit(now, failure_reasons.is_empty(), failure_reasons, Some(form.checks())))
        } else if since_last < self.thresholds.min_rep_spacing_secs {
            Some(self.emit(now, false, vec![TOO_FAST_REASON.to_owned()], None))
        } else {
            debug!(t = now, rep_duration, "Short cycle ignored");
            None
        }
    }

    fn emit(
        &mut self,
        timestamp: f64,
        correct: bool,
        failure_reasons: Vec<String>,
        checks: Option<RuleChecks>,
    ) -> RepEvent {
        self.emitted += 1;
        RepEvent {
            timestamp,
            rep_index: self.emitted,
            correct,
            failure_reasons,
            stage: self.stage,
            checks,
        }
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
