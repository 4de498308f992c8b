//! Bounded motion sample bus.
//!
//! Delivers readings from the platform listener to a single consumer in
//! delivery order. The sending side never blocks: a full buffer drops the
//! newest sample. The consumer sees every queued sample; none are skipped
//! on the receiving side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Default buffer capacity in samples.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Acceleration including gravity, one value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionReading {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A reading as delivered on the bus.
#[derive(Debug, Clone, Copy)]
pub struct MotionSample {
    /// Monotonic sequence number for ordering.
    pub seq: u64,
    /// Wall clock capture time in milliseconds since the UNIX epoch.
    pub ts_ms: i64,
    pub reading: MotionReading,
}

/// Configuration for the motion bus.
#[derive(Debug, Clone)]
pub struct MotionBusConfig {
    /// Maximum number of undelivered samples.
    pub capacity: usize,
}

impl Default for MotionBusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl MotionBusConfig {
    fn channel_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}

/// Sender half of the motion bus.
#[derive(Clone)]
pub struct MotionBusSender {
    tx: mpsc::Sender<MotionSample>,
    seq_counter: Arc<AtomicU64>,
    dropped_samples: Arc<AtomicU64>,
}

impl MotionBusSender {
    /// Send a reading stamped with the current wall clock time.
    ///
    /// Returns true if queued, false if dropped or the bus is closed.
    pub fn send(&self, reading: MotionReading) -> bool {
        self.send_at(chrono::Utc::now().timestamp_millis(), reading)
    }

    /// Send a reading with an explicit capture timestamp.
    pub fn send_at(&self, ts_ms: i64, reading: MotionReading) -> bool {
        let seq = self.seq_counter.fetch_add(1, Ordering::Relaxed);
        let sample = MotionSample {
            seq,
            ts_ms,
            reading,
        };

        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped_samples.fetch_add(1, Ordering::Relaxed) + 1;
                // Only log every 10th drop
                if dropped % 10 == 1 {
                    tracing::warn!(dropped, seq, "Motion bus full, dropping samples");
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Motion bus closed");
                false
            }
        }
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiver half of the motion bus.
pub struct MotionBusReceiver {
    rx: mpsc::Receiver<MotionSample>,
}

impl MotionBusReceiver {
    /// Receive the next sample. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<MotionSample> {
        self.rx.recv().await
    }
}

/// Motion bus connecting one producer side to one consumer.
pub struct MotionBus {
    sender: MotionBusSender,
    receiver: Option<MotionBusReceiver>,
}

impl MotionBus {
    pub fn new() -> Self {
        Self::with_config(MotionBusConfig::default())
    }

    pub fn with_config(config: MotionBusConfig) -> Self {
        let capacity = config.channel_capacity();
        let (tx, rx) = mpsc::channel(capacity);

        tracing::debug!(capacity, "Created motion bus");

        Self {
            sender: MotionBusSender {
                tx,
                seq_counter: Arc::new(AtomicU64::new(0)),
                dropped_samples: Arc::new(AtomicU64::new(0)),
            },
            receiver: Some(MotionBusReceiver { rx }),
        }
    }

    pub fn sender(&self) -> MotionBusSender {
        self.sender.clone()
    }

    /// Take the receiver (can only be called once).
    pub fn take_receiver(&mut self) -> Option<MotionBusReceiver> {
        self.receiver.take()
    }
}

impl Default for MotionBus {
    fn default() -> Self {
        Self::new()
    }
}
