//! Shake gesture detection for shaker.
//!
//! A heuristic threshold filter over raw accelerometer samples. It is not
//! a sensor-fusion library and makes no accuracy guarantees.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  config.rs   - ShakeOptions / ShakeConfig (normalized)       │
//! │  signs.rs    - direction accumulator                         │
//! │  detector.rs - evaluation ticks and cooldown state (pure)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  runtime.rs - subscription, cooldown timer, dispose          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shaker_detector::{create, ShakeOptions};
//! use shaker_motion::ChannelSource;
//! use std::sync::Arc;
//!
//! let source = ChannelSource::new();
//! let handle = create(
//!     Arc::new(|| println!("shake!")),
//!     Some(ShakeOptions { threshold: Some(60.0), ..Default::default() }),
//!     &source,
//! );
//!
//! // ... later
//! handle.dispose();
//! ```

mod config;
mod detector;
mod error;
mod runtime;
mod signs;

pub use config::{
    ShakeConfig, ShakeOptions, ZDelta, DEFAULT_CHECK_TIME, DEFAULT_FORBID, DEFAULT_RATIO,
    DEFAULT_THRESHOLD, DEFAULT_TIME_OUT,
};
pub use detector::{Evaluation, SampleOutcome, ShakeDetector};
pub use error::ConfigError;
pub use runtime::{create, ShakeCallback, ShakeHandle};
pub use signs::SignFlags;
