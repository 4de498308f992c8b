//! Recorded motion sessions.
//!
//! A recording is newline-delimited JSON, one sample per line:
//!
//! ```text
//! {"t":0,"x":0.1,"y":9.7,"z":0.3}
//! {"t":16,"x":0.4,"y":9.9,"z":0.2}
//! ```
//!
//! `t` is the offset in milliseconds from the start of the recording.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::bus::MotionReading;
use crate::{MotionError, Result};

/// One line of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    /// Milliseconds since the start of the recording.
    #[serde(rename = "t")]
    pub offset_ms: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RecordedSample {
    pub fn reading(&self) -> MotionReading {
        MotionReading::new(self.x, self.y, self.z)
    }
}

/// Parse a recording. Blank lines are skipped.
pub fn parse_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedSample>> {
    let mut samples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let sample = serde_json::from_str(trimmed).map_err(|source| MotionError::Parse {
            line: index + 1,
            source,
        })?;
        samples.push(sample);
    }

    tracing::debug!(samples = samples.len(), "Parsed motion recording");
    Ok(samples)
}
