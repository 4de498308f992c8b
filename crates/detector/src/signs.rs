//! Direction accumulator between evaluation ticks.

use bitflags::bitflags;

use shaker_motion::MotionReading;

bitflags! {
    /// Which directions each axis has moved in since the last tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SignFlags: u8 {
        const POS_X = 1 << 0;
        const NEG_X = 1 << 1;
        const POS_Y = 1 << 2;
        const NEG_Y = 1 << 3;
        const POS_Z = 1 << 4;
        const NEG_Z = 1 << 5;
    }
}

impl SignFlags {
    /// Mark the sign of each axis. Zero counts as negative.
    pub fn record(&mut self, reading: &MotionReading) {
        self.insert(axis_flag(reading.x, Self::POS_X, Self::NEG_X));
        self.insert(axis_flag(reading.y, Self::POS_Y, Self::NEG_Y));
        self.insert(axis_flag(reading.z, Self::POS_Z, Self::NEG_Z));
    }

    /// Number of directions seen, at least 1.
    pub fn turn(&self) -> u32 {
        self.bits().count_ones().max(1)
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

fn axis_flag(value: f64, positive: SignFlags, negative: SignFlags) -> SignFlags {
    if value > 0.0 {
        positive
    } else {
        negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_turn_is_one() {
        assert_eq!(SignFlags::empty().turn(), 1);
    }

    #[test]
    fn test_zero_is_negative() {
        let mut flags = SignFlags::empty();
        flags.record(&MotionReading::new(0.0, 0.0, 0.0));
        assert_eq!(flags, SignFlags::NEG_X | SignFlags::NEG_Y | SignFlags::NEG_Z);
    }

    #[test]
    fn test_flags_accumulate() {
        let mut flags = SignFlags::empty();
        flags.record(&MotionReading::new(3.0, -1.0, 9.8));
        flags.record(&MotionReading::new(-3.0, -2.0, 9.7));
        flags.record(&MotionReading::new(2.0, -1.0, 9.9));

        assert_eq!(flags.turn(), 4);
        assert!(flags.contains(SignFlags::POS_X | SignFlags::NEG_X));
        assert!(!flags.contains(SignFlags::POS_Y));
        assert!(!flags.contains(SignFlags::NEG_Z));
    }

    #[test]
    fn test_all_directions() {
        let mut flags = SignFlags::empty();
        flags.record(&MotionReading::new(1.0, 1.0, 1.0));
        flags.record(&MotionReading::new(-1.0, -1.0, -1.0));
        assert_eq!(flags, SignFlags::all());
        assert_eq!(flags.turn(), 6);

        flags.clear();
        assert!(flags.is_empty());
    }

    #[test]
    fn test_nan_is_negative() {
        let mut flags = SignFlags::empty();
        flags.record(&MotionReading::new(f64::NAN, 1.0, 1.0));
        assert!(flags.contains(SignFlags::NEG_X));
    }
}
