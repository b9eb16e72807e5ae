use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::error::ConfigError;
use crate::geometry::{
    ALIGNMENT_ANGLE_DEG, CONTRACTED_ANGLE_DEG, EXTENDED_ANGLE_DEG, MIN_REP_DURATION_SECS,
    MIN_REP_SPACING_SECS, SWING_WINDOW_SECS,
};
use crate::landmarks::Side;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub pose: PoseConfig,
    pub session: SessionConfig,
}

/// The tunable contract of the rule set and the rep state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub contracted_angle_deg: f32,
    pub extended_angle_deg: f32,
    pub alignment_angle_deg: f32,
    pub swing_window_secs: f64,
    pub min_rep_duration_secs: f64,
    pub min_rep_spacing_secs: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            contracted_angle_deg: CONTRACTED_ANGLE_DEG,
            extended_angle_deg: EXTENDED_ANGLE_DEG,
            alignment_angle_deg: ALIGNMENT_ANGLE_DEG,
            swing_window_secs: SWING_WINDOW_SECS,
            min_rep_duration_secs: MIN_REP_DURATION_SECS,
            min_rep_spacing_secs: MIN_REP_SPACING_SECS,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let angles = [
            self.contracted_angle_deg,
            self.extended_angle_deg,
            self.alignment_angle_deg,
        ];
        if angles.iter().any(|a| !(0.0..=180.0).contains(a)) {
            return Err(ConfigError::AngleOutOfRange);
        }
        if self.contracted_angle_deg >= self.extended_angle_deg {
            return Err(ConfigError::InvertedAngles {
                contracted: self.contracted_angle_deg,
                extended: self.extended_angle_deg,
            });
        }
        let durations = [
            ("swing_window_secs", self.swing_window_secs),
            ("min_rep_duration_secs", self.min_rep_duration_secs),
            ("min_rep_spacing_secs", self.min_rep_spacing_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub side: Side,
    pub min_visibility: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            side: Side::Left,
            // Detection confidence is applied upstream to the whole body.
            min_visibility: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Zero runs until the pose stream ends.
    pub duration_secs: f64,
    pub events_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 15.0,
            events_path: PathBuf::from("exercise_data.jsonl"),
            report_path: None,
        }
    }
}

impl SessionConfig {
    pub fn deadline_secs(&self) -> Option<f64> {
        (self.duration_secs > 0.0).then_some(self.duration_secs)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.pose.min_visibility) {
            return Err(ConfigError::InvalidVisibility(self.pose.min_visibility));
        }
        if !self.session.duration_secs.is_finite() || self.session.duration_secs < 0.0 {
            return Err(ConfigError::InvalidDuration {
                name: "duration_secs",
                value: self.session.duration_secs,
            });
        }
        Ok(())
    }
}
