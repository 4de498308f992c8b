//! Capability providers for motion input.
//!
//! These traits abstract the platform's motion sensor, so detectors can be
//! driven by a real device listener or by a fake source under test.

use std::sync::Mutex;

use crate::bus::{MotionBus, MotionBusConfig, MotionBusReceiver, MotionBusSender};

/// A platform capability that delivers motion samples.
pub trait MotionSource: Send + Sync {
    /// Whether the runtime exposes motion samples at all.
    fn is_available(&self) -> bool;

    /// Subscribe to the sample stream.
    ///
    /// Returns `None` when the capability is absent or the stream already
    /// has a subscriber.
    fn subscribe(&self) -> Option<MotionBusReceiver>;
}

/// Source for runtimes without a motion sensor.
pub struct NullSource;

impl MotionSource for NullSource {
    fn is_available(&self) -> bool {
        false
    }

    fn subscribe(&self) -> Option<MotionBusReceiver> {
        None
    }
}

/// In-process source backed by a [`MotionBus`].
///
/// The sender side is handed to whatever produces readings: a platform
/// listener, a recording replayer or a test.
pub struct ChannelSource {
    sender: MotionBusSender,
    receiver: Mutex<Option<MotionBusReceiver>>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::with_config(MotionBusConfig::default())
    }

    pub fn with_config(config: MotionBusConfig) -> Self {
        let mut bus = MotionBus::with_config(config);
        Self {
            sender: bus.sender(),
            receiver: Mutex::new(bus.take_receiver()),
        }
    }

    pub fn sender(&self) -> MotionBusSender {
        self.sender.clone()
    }
}

impl Default for ChannelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for ChannelSource {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&self) -> Option<MotionBusReceiver> {
        let receiver = self.receiver.lock().ok()?.take();
        if receiver.is_none() {
            tracing::warn!("Motion source already has a subscriber");
        }
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MotionReading;

    #[test]
    fn test_null_source_is_inert() {
        let source = NullSource;
        assert!(!source.is_available());
        assert!(source.subscribe().is_none());
    }

    #[test]
    fn test_channel_source_single_subscription() {
        let source = ChannelSource::new();
        assert!(source.is_available());
        assert!(source.subscribe().is_some());
        assert!(source.subscribe().is_none());
    }

    #[tokio::test]
    async fn test_channel_source_delivers() {
        let source = ChannelSource::new();
        let mut receiver = source.subscribe().unwrap();

        source.sender().send(MotionReading::new(0.5, 0.0, 9.8));

        let sample = receiver.recv().await.unwrap();
        assert_eq!(sample.reading.z, 9.8);
    }
}
