//! Detector configuration.
//!
//! [`ShakeOptions`] is what callers hand in: every key is optional and
//! unknown keys are ignored. [`ShakeConfig`] is what the detector runs
//! with, after defaults and normalization have been applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_THRESHOLD: f64 = 100.0;
pub const DEFAULT_RATIO: f64 = 1.0;
pub const DEFAULT_CHECK_TIME: Duration = Duration::from_millis(100);
pub const DEFAULT_TIME_OUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_FORBID: Duration = Duration::from_millis(1000);

/// How the z-axis delta is computed on an evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZDelta {
    /// `|x - last_y|`, the historical formula.
    #[default]
    CrossAxis,
    /// `|z - last_z|`.
    ZAxis,
}

/// Caller-supplied overrides. Durations are in milliseconds.
///
/// Numbers are taken as given and fixed up by [`ShakeConfig::from_options`]:
/// durations round to whole milliseconds, negatives clamp to zero and NaN
/// falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeOptions {
    pub threshold: Option<f64>,
    pub ratio: Option<f64>,
    pub speed_x: Option<f64>,
    pub speed_y: Option<f64>,
    pub speed_z: Option<f64>,
    pub check_time: Option<f64>,
    pub time_out: Option<f64>,
    pub forbid: Option<f64>,
    pub count: Option<f64>,
    pub z_delta: Option<ZDelta>,
}

impl ShakeOptions {
    /// Parse options from a JSON object. Unrecognized keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ShakeConfig {
    /// Minimum combined magnitude to trigger.
    pub threshold: f64,
    /// Multiplier applied to the raw magnitude. Always positive.
    pub ratio: f64,
    /// Per-axis minimum delta.
    pub speed_x: f64,
    pub speed_y: f64,
    pub speed_z: f64,
    /// Minimum time between evaluation ticks. Never exceeds `time_out`.
    pub check_time: Duration,
    /// Maximum time between evaluation ticks for a trigger to count.
    pub time_out: Duration,
    /// Cooldown after a trigger. Zero disables the cooldown.
    pub forbid: Duration,
    /// Accepted for compatibility; not read by detection.
    pub count: f64,
    pub z_delta: ZDelta,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ratio: DEFAULT_RATIO,
            speed_x: 0.0,
            speed_y: 0.0,
            speed_z: 0.0,
            check_time: DEFAULT_CHECK_TIME,
            time_out: DEFAULT_TIME_OUT,
            forbid: DEFAULT_FORBID,
            count: 0.0,
            z_delta: ZDelta::default(),
        }
    }
}

impl ShakeConfig {
    /// Apply overrides on top of the defaults, then normalize.
    pub fn from_options(options: &ShakeOptions) -> Self {
        let defaults = Self::default();

        let mut config = Self {
            threshold: options.threshold.unwrap_or(defaults.threshold),
            ratio: options.ratio.unwrap_or(defaults.ratio),
            speed_x: options.speed_x.unwrap_or(defaults.speed_x),
            speed_y: options.speed_y.unwrap_or(defaults.speed_y),
            speed_z: options.speed_z.unwrap_or(defaults.speed_z),
            check_time: millis_or(options.check_time, defaults.check_time),
            time_out: millis_or(options.time_out, defaults.time_out),
            forbid: millis_or(options.forbid, defaults.forbid),
            count: options.count.unwrap_or(defaults.count),
            z_delta: options.z_delta.unwrap_or(defaults.z_delta),
        };
        config.normalize();
        config
    }

    /// Clamp `check_time` to `time_out` and replace a non-positive ratio.
    pub fn normalize(&mut self) {
        if self.check_time > self.time_out {
            self.check_time = self.time_out;
        }
        if self.ratio.is_nan() || self.ratio <= 0.0 {
            self.ratio = DEFAULT_RATIO;
        }
    }

    /// Whether a trigger starts a cooldown.
    pub fn has_cooldown(&self) -> bool {
        !self.forbid.is_zero()
    }
}

/// Whole milliseconds, clamped at zero. NaN or unset keeps `default`.
fn millis_or(value: Option<f64>, default: Duration) -> Duration {
    match value {
        Some(ms) if !ms.is_nan() => Duration::from_millis(ms.max(0.0).round() as u64),
        _ => default,
    }
}

impl From<ShakeOptions> for ShakeConfig {
    fn from(options: ShakeOptions) -> Self {
        Self::from_options(&options)
    }
}
