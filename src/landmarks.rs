//! Mapping from the pose detector's landmark layout to the joints the
//! classifier consumes.
//!
//! The upstream detector emits 33 landmarks in the MediaPipe Pose order.
//! Only one side of the body is needed; a frame where any required joint
//! is missing or poorly visible is treated as "no body detected".

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

pub const LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Which side of the body drives classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    /// Landmark indices for shoulder, elbow, wrist, hip, knee.
    pub fn indices(self) -> [usize; 5] {
        match self {
            Side::Left => [LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP, LEFT_KNEE],
            Side::Right => [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP, RIGHT_KNEE],
        }
    }
}

/// One frame's worth of joint positions, in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointSample {
    pub shoulder: Point,
    pub elbow: Point,
    pub wrist: Point,
    pub hip: Point,
    pub knee: Point,
    /// Monotonic seconds.
    pub timestamp: f64,
}

impl KeypointSample {
    pub fn from_landmarks(
        landmarks: &[Landmark],
        side: Side,
        min_visibility: f32,
        timestamp: f64,
    ) -> Option<Self> {
        let [shoulder, elbow, wrist, hip, knee] = side.indices();

        let joint = |idx: usize| -> Option<Point> {
            let lm = landmarks.get(idx)?;
            let usable =
                lm.x.is_finite() && lm.y.is_finite() && lm.visibility >= min_visibility;
            usable.then(|| lm.point())
        };

        Some(Self {
            shoulder: joint(shoulder)?,
            elbow: joint(elbow)?,
            wrist: joint(wrist)?,
            hip: joint(hip)?,
            knee: joint(knee)?,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.0, 0.0); LANDMARK_COUNT];
        landmarks[LEFT_SHOULDER] = Landmark::new(0.40, 0.30);
        landmarks[LEFT_ELBOW] = Landmark::new(0.40, 0.45);
        landmarks[LEFT_WRIST] = Landmark::new(0.40, 0.60);
        landmarks[LEFT_HIP] = Landmark::new(0.40, 0.60);
        landmarks[LEFT_KNEE] = Landmark::new(0.40, 0.80);
        landmarks[RIGHT_SHOULDER] = Landmark::new(0.60, 0.30);
        landmarks
    }

    #[test]
    fn picks_requested_side() {
        let sample = KeypointSample::from_landmarks(&skeleton(), Side::Left, 0.5, 1.0).unwrap();
        assert_eq!(sample.shoulder, Point::new(0.40, 0.30));
        assert_eq!(sample.knee, Point::new(0.40, 0.80));
        assert_eq!(sample.timestamp, 1.0);

        let mut landmarks = skeleton();
        for idx in Side::Right.indices() {
            landmarks[idx].x += 0.2;
        }
        let right = KeypointSample::from_landmarks(&landmarks, Side::Right, 0.5, 1.0).unwrap();
        assert!((right.shoulder.x - 0.80).abs() < 1e-6);
    }

    #[test]
    fn low_visibility_is_no_detection() {
        let mut landmarks = skeleton();
        landmarks[LEFT_WRIST].visibility = 0.2;
        assert!(KeypointSample::from_landmarks(&landmarks, Side::Left, 0.5, 0.0).is_none());
        assert!(KeypointSample::from_landmarks(&landmarks, Side::Left, 0.1, 0.0).is_some());
    }

    #[test]
    fn truncated_or_non_finite_is_no_detection() {
        let landmarks = skeleton();
        assert!(KeypointSample::from_landmarks(&landmarks[..20], Side::Left, 0.5, 0.0).is_none());

        let mut landmarks = skeleton();
        landmarks[LEFT_HIP].y = f32::NAN;
        assert!(KeypointSample::from_landmarks(&landmarks, Side::Left, 0.5, 0.0).is_none());
    }

    #[test]
    fn visibility_defaults_when_absent() {
        let lm: Landmark = serde_json::from_str(r#"{"x": 0.1, "y": 0.2}"#).unwrap();
        assert_eq!(lm.visibility, 1.0);
        assert_eq!(lm.z, 0.0);
    }
}
