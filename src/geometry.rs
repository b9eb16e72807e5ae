//! Joint-angle geometry and the timing predicates the form rules are built on.
//!
//! Everything here is pure. Thresholds are named constants so another
//! exercise can swap them through [`crate::config::Thresholds`].

use serde::{Deserialize, Serialize};

/// Driving angle below which the joint counts as fully contracted.
pub const CONTRACTED_ANGLE_DEG: f32 = 30.0;
/// Driving angle above which the joint counts as fully extended.
pub const EXTENDED_ANGLE_DEG: f32 = 160.0;
/// Hip angle above which shoulder, hip and knee count as aligned.
pub const ALIGNMENT_ANGLE_DEG: f32 = 160.0;
/// Completions closer together than this are treated as swinging.
pub const SWING_WINDOW_SECS: f64 = 0.5;
/// A cycle must last longer than this to be evaluated for form.
pub const MIN_REP_DURATION_SECS: f64 = 0.5;
/// Short cycles arriving within this long of the last completed rep are "too fast".
pub const MIN_REP_SPACING_SECS: f64 = 1.5;

/// Returned by [`angle`] when two of the three points coincide.
pub const DEGENERATE_ANGLE_DEG: f32 = 0.0;

const COINCIDENT_EPS: f32 = 1e-6;

/// A 2-D point in normalized image space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn coincides_with(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < COINCIDENT_EPS && (self.y - other.y).abs() < COINCIDENT_EPS
    }
}

/// Angle at vertex `b` between the rays `b->a` and `b->c`, in [0, 180].
///
/// Returns `None` when `a` or `c` coincides with `b`, since the ray
/// direction is undefined.
pub fn joint_angle(a: Point, b: Point, c: Point) -> Option<f32> {
    if a.coincides_with(&b) || c.coincides_with(&b) {
        return None;
    }

    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    Some(degrees)
}

/// Total version of [`joint_angle`]: degenerate input yields [`DEGENERATE_ANGLE_DEG`].
pub fn angle(a: Point, b: Point, c: Point) -> f32 {
    joint_angle(a, b, c).unwrap_or(DEGENERATE_ANGLE_DEG)
}

/// Torso straightness: the hip angle must exceed `threshold_deg`.
///
/// Degenerate geometry is reported as misaligned.
pub fn is_aligned(shoulder: Point, hip: Point, knee: Point, threshold_deg: f32) -> bool {
    joint_angle(shoulder, hip, knee).is_some_and(|a| a > threshold_deg)
}

/// True when fewer than `window_secs` have passed since the previous
/// completed rep. No previous rep means no succession.
pub fn is_rapid_succession(previous: Option<f64>, current: f64, window_secs: f64) -> bool {
    match previous {
        Some(prev) => elapsed(prev, current) < window_secs,
        None => false,
    }
}

/// True when the driving angle sits strictly between the two extremes.
pub fn is_incomplete_range(angle_deg: f32, contracted_deg: f32, extended_deg: f32) -> bool {
    !(angle_deg < contracted_deg || angle_deg > extended_deg)
}

/// Seconds from `earlier` to `later`, clamped at zero for clocks that step back.
pub fn elapsed(earlier: f64, later: f64) -> f64 {
    (later - earlier).max(0.0)
}
