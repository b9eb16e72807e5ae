//! The fixed set of form rules evaluated on every tracked frame.
//!
//! Rules are independent: every failing rule is reported, in the order of
//! [`FormRule::ALL`].

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::geometry::{is_aligned, is_incomplete_range, is_rapid_succession};
use crate::landmarks::KeypointSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormRule {
    ElbowClose,
    StraightWrist,
    BodyAlignment,
    NoSwinging,
    FullRangeOfMotion,
}

impl FormRule {
    pub const ALL: [FormRule; 5] = [
        FormRule::ElbowClose,
        FormRule::StraightWrist,
        FormRule::BodyAlignment,
        FormRule::NoSwinging,
        FormRule::FullRangeOfMotion,
    ];

    /// Message shown to the user when the rule fails.
    pub fn violation(self) -> &'static str {
        match self {
            FormRule::ElbowClose => "Ensure your elbows are close to your torso.",
            FormRule::StraightWrist => "Ensure your shoulders are unshrugged.",
            FormRule::BodyAlignment => "Body alignment: Keep shoulder, hip, and knee aligned.",
            FormRule::NoSwinging => "Swinging motion: Avoid abrupt movements.",
            FormRule::FullRangeOfMotion => {
                "Incomplete range of motion: Ensure full extension and contraction."
            }
        }
    }

    fn check(self, ctx: &RuleContext<'_>) -> bool {
        let t = ctx.thresholds;
        let s = ctx.sample;
        match self {
            FormRule::ElbowClose => ctx.driving_angle < t.contracted_angle_deg,
            // Image y grows downwards: the wrist must sit lower than the shoulder.
            FormRule::StraightWrist => s.wrist.y > s.shoulder.y,
            FormRule::BodyAlignment => is_aligned(s.shoulder, s.hip, s.knee, t.alignment_angle_deg),
            FormRule::NoSwinging => {
                !is_rapid_succession(ctx.previous_completion, s.timestamp, t.swing_window_secs)
            }
            FormRule::FullRangeOfMotion => !is_incomplete_range(
                ctx.driving_angle,
                t.contracted_angle_deg,
                t.extended_angle_deg,
            ),
        }
    }
}

/// Inputs shared by every rule for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub sample: &'a KeypointSample,
    pub driving_angle: f32,
    pub previous_completion: Option<f64>,
    pub thresholds: &'a Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormVerdict {
    pub rule: FormRule,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Verdicts of all rules for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormReport {
    pub verdicts: [FormVerdict; 5],
}

impl FormReport {
    pub fn evaluate(ctx: &RuleContext<'_>) -> Self {
        let verdicts = FormRule::ALL.map(|rule| {
            let passed = rule.check(ctx);
            FormVerdict {
                rule,
                passed,
                reason: (!passed).then(|| rule.violation()),
            }
        });
        Self { verdicts }
    }

    pub fn all_passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    pub fn passed(&self, rule: FormRule) -> bool {
        self.verdicts
            .iter()
            .find(|v| v.rule == rule)
            .is_some_and(|v| v.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.verdicts.iter().filter_map(|v| v.reason)
    }

    pub fn checks(&self) -> RuleChecks {
        RuleChecks {
            elbow_close: self.passed(FormRule::ElbowClose),
            straight_wrist: self.passed(FormRule::StraightWrist),
            body_alignment: self.passed(FormRule::BodyAlignment),
            no_swinging: self.passed(FormRule::NoSwinging),
            full_range_of_motion: self.passed(FormRule::FullRangeOfMotion),
        }
    }
}

/// Flat pass/fail snapshot written alongside each audited rep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleChecks {
    pub elbow_close: bool,
    pub straight_wrist: bool,
    pub body_alignment: bool,
    pub no_swinging: bool,
    pub full_range_of_motion: bool,
}
