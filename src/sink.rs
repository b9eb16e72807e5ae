//! Append-only audit log of rep events.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SinkError;
use crate::rep_counter::RepEvent;

pub trait RepEventSink {
    fn record(&mut self, event: &RepEvent) -> Result<(), SinkError>;
}

/// Writes one JSON record per line, flushed after each event.
pub struct JsonLinesLog<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl JsonLinesLog<BufWriter<File>> {
    /// Creates (or truncates) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RepEventSink for JsonLinesLog<W> {
    fn record(&mut self, event: &RepEvent) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every event in memory, in completion order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<RepEvent>,
}

impl RepEventSink for MemorySink {
    fn record(&mut self, event: &RepEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}

impl<S: RepEventSink + ?Sized> RepEventSink for Box<S> {
    fn record(&mut self, event: &RepEvent) -> Result<(), SinkError> {
        (**self).record(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rep_counter::RepStage;
    use crate::rules::RuleChecks;
    use std::io::{BufRead, BufReader};

    fn event(index: u32, correct: bool) -> RepEvent {
        RepEvent {
            timestamp: 1.5 * index as f64,
            rep_index: index,
            correct,
            failure_reasons: if correct {
                vec![]
            } else {
                vec!["Swinging motion: Avoid abrupt movements.".into()]
            },
            stage: RepStage::Contracted,
            checks: Some(RuleChecks {
                elbow_close: true,
                straight_wrist: true,
                body_alignment: true,
                no_swinging: correct,
                full_range_of_motion: true,
            }),
        }
    }

    #[test]
    fn writes_one_line_per_event_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut log = JsonLinesLog::create(&path).unwrap();
        log.record(&event(1, true)).unwrap();
        log.record(&event(2, false)).unwrap();

        let lines: Vec<String> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let second: RepEvent = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second, event(2, false));
        assert!(lines[0].contains("\"stage\":\"Contracted\""));
    }

    #[test]
    fn create_truncates_previous_session_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(&path, "stale line\nanother\n").unwrap();

        let mut log = JsonLinesLog::create(&path).unwrap();
        log.record(&event(1, true)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(!content.contains("stale"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_surfaces_as_error() {
        let mut log = JsonLinesLog::new(FailingWriter);
        assert!(log.record(&event(1, true)).is_err());
    }
}
