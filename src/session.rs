//! Session totals and the failure-reason log.
//!
//! `SessionStats` is owned behind a [`SessionHandle`] so a report reader on
//! another thread can snapshot it while the frame loop keeps folding events.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::rep_counter::RepEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonEntry {
    /// Ordinal of the incorrect rep this reason belongs to (1-based).
    pub incorrect_rep: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total_reps: u32,
    pub correct_reps: u32,
    pub incorrect_reps: u32,
    pub reasons: Vec<ReasonEntry>,
}

impl SessionStats {
    pub fn record(&mut self, event: &RepEvent) {
        self.total_reps += 1;
        if event.correct {
            self.correct_reps += 1;
            return;
        }

        self.incorrect_reps += 1;
        let ordinal = self.incorrect_reps;
        self.reasons
            .extend(event.failure_reasons.iter().map(|message| ReasonEntry {
                incorrect_rep: ordinal,
                message: message.clone(),
            }));
    }

    /// Reasons as one block of text, one line per reason.
    pub fn reason_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.reasons {
            text.push_str(&format!(
                "Incorrect Rep {}: {}\n",
                entry.incorrect_rep, entry.message
            ));
        }
        text
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            total_reps: self.total_reps,
            correct_reps: self.correct_reps,
            incorrect_reps: self.incorrect_reps,
            reason_text: self.reason_text(),
            reasons: self.reasons.clone(),
        }
    }
}

/// Snapshot returned by the report query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    #[serde(rename = "Total Reps")]
    pub total_reps: u32,
    #[serde(rename = "Correct Reps")]
    pub correct_reps: u32,
    #[serde(rename = "Incorrect Reps")]
    pub incorrect_reps: u32,
    #[serde(rename = "Reason for Incorrect Reps")]
    pub reason_text: String,
    pub reasons: Vec<ReasonEntry>,
}

/// Shared handle to one session's stats. Clones refer to the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionStats>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not make the stats unreadable.
    fn lock(&self) -> MutexGuard<'_, SessionStats> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, event: &RepEvent) {
        self.lock().record(event);
    }

    pub fn correct_reps(&self) -> u32 {
        self.lock().correct_reps
    }

    pub fn snapshot(&self) -> SessionStats {
        self.lock().clone()
    }

    pub fn report(&self) -> SessionReport {
        self.snapshot().report()
    }

    /// Clear all totals and reasons. Only called on explicit restart.
    pub fn reset(&self) {
        *self.lock() = SessionStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rep_counter::RepStage;
    use std::thread;

    fn event(index: u32, reasons: &[&str]) -> RepEvent {
        RepEvent {
            timestamp: index as f64,
            rep_index: index,
            correct: reasons.is_empty(),
            failure_reasons: reasons.iter().map(|r| r.to_string()).collect(),
            stage: RepStage::Contracted,
            checks: None,
        }
    }

    #[test]
    fn totals_always_balance() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.total_reps, stats.correct_reps + stats.incorrect_reps);

        for (i, reasons) in [&[][..], &["a"][..], &[][..], &["b", "c"][..]].iter().enumerate() {
            stats.record(&event(i as u32 + 1, reasons));
            assert_eq!(stats.total_reps, stats.correct_reps + stats.incorrect_reps);
        }
        assert_eq!(stats.total_reps, 4);
        assert_eq!(stats.correct_reps, 2);
        assert_eq!(stats.incorrect_reps, 2);
    }

    #[test]
    fn reasons_are_tagged_with_incorrect_ordinal() {
        let mut stats = SessionStats::default();
        stats.record(&event(1, &[]));
        stats.record(&event(2, &["Too low."]));
        stats.record(&event(3, &["Too fast.", "Too wide."]));

        assert_eq!(
            stats.reason_text(),
            "Incorrect Rep 1: Too low.\nIncorrect Rep 2: Too fast.\nIncorrect Rep 2: Too wide.\n"
        );
        assert_eq!(stats.reasons[2].incorrect_rep, 2);
    }

    #[test]
    fn report_uses_display_keys() {
        let handle = SessionHandle::new();
        handle.record(&event(1, &["Too low."]));
        let json = serde_json::to_value(handle.report()).unwrap();
        assert_eq!(json["Total Reps"], 1);
        assert_eq!(json["Correct Reps"], 0);
        assert_eq!(json["Incorrect Reps"], 1);
        assert_eq!(json["Reason for Incorrect Reps"], "Incorrect Rep 1: Too low.\n");
    }

    #[test]
    fn reset_clears_everything() {
        let handle = SessionHandle::new();
        handle.record(&event(1, &["x"]));
        handle.reset();
        assert_eq!(handle.snapshot(), SessionStats::default());
    }

    #[test]
    fn concurrent_reader_never_sees_torn_totals() {
        let handle = SessionHandle::new();
        let writer = {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 1..=500 {
                    let reasons: &[&str] = if i % 3 == 0 { &["bad"] } else { &[] };
                    handle.record(&event(i, reasons));
                }
            })
        };

        for _ in 0..500 {
            let s = handle.snapshot();
            assert_eq!(s.total_reps, s.correct_reps + s.incorrect_reps);
            assert_eq!(s.reasons.len() as u32, s.incorrect_reps);
        }
        writer.join().unwrap();
        assert_eq!(handle.snapshot().total_reps, 500);
    }
}
