//! Error types for the detector.

use thiserror::Error;

/// Errors that can occur while reading detector options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options are not a JSON object of the expected shape.
    #[error("invalid shake options: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
