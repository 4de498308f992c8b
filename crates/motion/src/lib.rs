//! Motion input boundary for shaker.
//!
//! Platform glue (a device-motion event listener, an IMU driver, a test
//! harness) pushes acceleration readings into a [`MotionBus`]. Consumers
//! never touch the platform directly: they ask a [`MotionSource`] whether
//! the capability exists and, if so, take a subscription.
//!
//! # Example
//!
//! ```ignore
//! use shaker_motion::{ChannelSource, MotionReading, MotionSource};
//!
//! let source = ChannelSource::new();
//! let sender = source.sender();
//! let mut receiver = source.subscribe().expect("capability available");
//!
//! sender.send(MotionReading::new(0.3, 9.8, 0.1));
//! ```

mod bus;
mod error;
mod provider;
mod replay;

pub use bus::{
    MotionBus, MotionBusConfig, MotionBusReceiver, MotionBusSender, MotionReading, MotionSample,
    DEFAULT_BUS_CAPACITY,
};
pub use error::MotionError;
pub use provider::{ChannelSource, MotionSource, NullSource};
pub use replay::{parse_recording, RecordedSample};

pub type Result<T> = std::result::Result<T, MotionError>;
