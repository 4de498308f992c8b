//! Shake detection state machine.
//!
//! Pure and synchronous: the caller supplies each reading together with
//! the time it arrived, and owns the cooldown timer. Between evaluation
//! ticks (at least `check_time` apart) samples only record which
//! directions each axis moved in. On a tick the per-axis deltas against
//! the previous tick are combined with the direction count into a
//! magnitude, and a trigger fires when every threshold is exceeded.

use std::time::{Duration, Instant};

use shaker_motion::MotionReading;

use crate::config::{ShakeConfig, ZDelta};
use crate::signs::SignFlags;

/// What happened to a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Dropped because the detector is cooling down.
    Suppressed,
    /// Recorded in the direction accumulator only.
    Accumulated,
    /// An evaluation tick ran.
    Evaluated(Evaluation),
}

impl SampleOutcome {
    pub fn is_trigger(&self) -> bool {
        matches!(self, SampleOutcome::Evaluated(eval) if eval.triggered)
    }
}

/// Result of one evaluation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub speed_x: f64,
    pub speed_y: f64,
    pub speed_z: f64,
    pub turn: u32,
    pub magnitude: f64,
    /// Time since the previous tick; `None` on the first tick.
    pub elapsed: Option<Duration>,
    pub triggered: bool,
    /// Cooldown the caller must time, when the trigger started one.
    pub cooldown: Option<Duration>,
}

/// Shake detector state.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    config: ShakeConfig,
    last_update: Option<Instant>,
    last_reading: Option<MotionReading>,
    signs: SignFlags,
    forbidden: bool,
}

impl ShakeDetector {
    pub fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            last_update: None,
            last_reading: None,
            signs: SignFlags::empty(),
            forbidden: false,
        }
    }

    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    /// Reading stored at the most recent evaluation tick.
    pub fn last_reading(&self) -> Option<MotionReading> {
        self.last_reading
    }

    pub fn signs(&self) -> SignFlags {
        self.signs
    }

    pub fn is_cooling_down(&self) -> bool {
        self.forbidden
    }

    /// Leave the cooldown. Called when the cooldown timer fires.
    pub fn end_cooldown(&mut self) {
        if self.forbidden {
            tracing::debug!("Shake cooldown ended");
        }
        self.forbidden = false;
    }

    /// Feed one reading that arrived at `now`.
    pub fn handle_sample(&mut self, reading: MotionReading, now: Instant) -> SampleOutcome {
        if self.forbidden {
            return SampleOutcome::Suppressed;
        }

        self.signs.record(&reading);

        let elapsed = self
            .last_update
            .map(|last| now.saturating_duration_since(last));

        if let Some(elapsed) = elapsed {
            if elapsed < self.config.check_time {
                return SampleOutcome::Accumulated;
            }
        }

        SampleOutcome::Evaluated(self.evaluate(reading, now, elapsed))
    }

    fn evaluate(
        &mut self,
        reading: MotionReading,
        now: Instant,
        elapsed: Option<Duration>,
    ) -> Evaluation {
        self.last_update = Some(now);

        // Unset previous values compare as zero
        let last = self.last_reading.unwrap_or_default();
        let speed_x = (reading.x - last.x).abs();
        let speed_y = (reading.y - last.y).abs();
        let speed_z = match self.config.z_delta {
            ZDelta::CrossAxis => (reading.x - last.y).abs(),
            ZDelta::ZAxis => (reading.z - last.z).abs(),
        };

        let turn = self.signs.turn();
        let magnitude = (speed_x + speed_y + speed_z) * turn as f64 * self.config.ratio;

        let config = &self.config;
        let within_time_out = elapsed.is_some_and(|elapsed| elapsed <= config.time_out);
        let triggered = speed_x > config.speed_x
            && speed_y > config.speed_y
            && speed_z > config.speed_z
            && magnitude > config.threshold
            && within_time_out;

        tracing::trace!(
            speed_x,
            speed_y,
            speed_z,
            turn,
            magnitude,
            elapsed_ms = elapsed.map(|e| e.as_millis() as u64),
            triggered,
            "Shake evaluation tick"
        );

        let cooldown = if triggered && config.has_cooldown() {
            self.forbidden = true;
            Some(config.forbid)
        } else {
            None
        };

        self.signs.clear();
        self.last_reading = Some(reading);

        Evaluation {
            speed_x,
            speed_y,
            speed_z,
            turn,
            magnitude,
            elapsed,
            triggered,
            cooldown,
        }
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(ShakeConfig::default())
    }
}
