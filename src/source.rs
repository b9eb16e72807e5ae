use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::error::SourceError;
use crate::landmarks::Landmark;

/// Output of the pose detector for one video frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoseFrame {
    /// Capture time in seconds; stamped by the driver's clock when absent.
    #[serde(default, rename = "t")]
    pub timestamp: Option<f64>,
    /// `None` when no body was detected.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

pub trait PoseSource {
    /// Next frame, or `Ok(None)` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, SourceError>;
}

/// Replays recorded detector output stored as JSON lines.
pub struct ReplaySource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> PoseSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, SourceError> {
        loop {
            self.buf.clear();
            // Raw bytes so that invalid UTF-8 is a bad frame, not a broken stream.
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return serde_json::from_slice(&self.buf)
                .map(Some)
                .map_err(|source| SourceError::Malformed {
                    line: self.line,
                    source,
                });
        }
    }
}
