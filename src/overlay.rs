//! Current values for on-screen display: rep count, stage, driving angle,
//! and whatever rules the current frame is failing.

use crate::rep_counter::{FrameOutcome, RepStage};

#[derive(Debug, Clone, Default)]
pub struct Overlay {
    reps: u32,
    stage: Option<RepStage>,
    angle: Option<f32>,
    violations: Vec<&'static str>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, outcome: &FrameOutcome, reps: u32) {
        self.reps = reps;
        self.stage = Some(outcome.stage);
        self.angle = Some(outcome.angle);
        self.violations = outcome.form.failures().collect();
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn stage_label(&self) -> &'static str {
        self.stage.map_or("None", RepStage::label)
    }

    pub fn angle(&self) -> Option<f32> {
        self.angle
    }

    pub fn violations(&self) -> &[&'static str] {
        &self.violations
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("REPS {}", self.reps),
            format!("STAGE {}", self.stage_label()),
        ];
        lines.extend(self.violations.iter().map(|v| v.to_string()));
        lines
    }
}
