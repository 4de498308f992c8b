//! Error types for motion input.

use thiserror::Error;

/// Errors that can occur while reading motion recordings.
#[derive(Debug, Error)]
pub enum MotionError {
    /// The recording could not be read.
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    /// A recording line is not a valid sample.
    #[error("invalid sample on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
