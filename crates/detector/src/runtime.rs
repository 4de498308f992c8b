//! Detector lifecycle: subscribe, run, dispose.
//!
//! [`create`] subscribes a [`ShakeDetector`] to a [`MotionSource`] and runs
//! it on one tokio task. Sample delivery and the cooldown timer are both
//! handled by that task's `select!` loop, so the two never interleave.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use shaker_motion::{MotionBusReceiver, MotionSource};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{ShakeConfig, ShakeOptions};
use crate::detector::{SampleOutcome, ShakeDetector};

/// Invoked once per detected shake.
pub type ShakeCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Owned handle to a running detector.
///
/// Dropping the handle disposes the detector.
#[must_use = "dropping the handle disposes the detector"]
pub struct ShakeHandle {
    config: ShakeConfig,
    cancel_token: CancellationToken,
    running: Arc<AtomicBool>,
    triggers: Arc<AtomicU64>,
}

impl ShakeHandle {
    fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
            running: Arc::new(AtomicBool::new(false)),
            triggers: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Effective configuration after normalization.
    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    /// Whether the detector is subscribed and processing samples.
    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of shakes detected so far.
    pub fn triggers(&self) -> u64 {
        self.triggers.load(Ordering::Relaxed)
    }

    /// Stop processing samples and drop any pending cooldown.
    ///
    /// The subscription is released once the detector task exits.
    pub fn dispose(&self) {
        self.cancel_token.cancel();
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for ShakeHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Create a detector and subscribe it to `source`.
///
/// Options are normalized rather than rejected. When the source has no
/// motion capability, or no tokio runtime is running, the returned handle
/// is inert and `callback` is never invoked.
pub fn create<S>(callback: ShakeCallback, options: Option<ShakeOptions>, source: &S) -> ShakeHandle
where
    S: MotionSource + ?Sized,
{
    let config = options.map(ShakeConfig::from).unwrap_or_default();
    let handle = ShakeHandle::new(config.clone());

    if !source.is_available() {
        tracing::warn!("Motion capability unavailable, shake detector inactive");
        return handle;
    }

    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "No tokio runtime, shake detector inactive");
            return handle;
        }
    };

    let Some(receiver) = source.subscribe() else {
        tracing::warn!("Motion subscription refused, shake detector inactive");
        return handle;
    };

    handle.running.store(true, Ordering::Release);

    runtime.spawn(run_detector(
        ShakeDetector::new(config),
        receiver,
        callback,
        handle.cancel_token.child_token(),
        Arc::clone(&handle.running),
        Arc::clone(&handle.triggers),
    ));

    handle
}

/// Clears the running flag however the detector task ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_detector(
    mut detector: ShakeDetector,
    mut receiver: MotionBusReceiver,
    callback: ShakeCallback,
    cancel_token: CancellationToken,
    running: Arc<AtomicBool>,
    triggers: Arc<AtomicU64>,
) {
    let _running = RunningGuard(running);
    tracing::info!(config = ?detector.config(), "Shake detector started");

    let mut cooldown_until: Option<Instant> = None;
    let mut samples_processed = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                tracing::info!("Shake detector disposed");
                break;
            }
            _ = time::sleep_until(cooldown_until.unwrap_or_else(Instant::now)), if cooldown_until.is_some() => {
                cooldown_until = None;
                detector.end_cooldown();
            }
            sample = receiver.recv() => {
                let Some(sample) = sample else {
                    tracing::info!("Motion bus closed, stopping shake detector");
                    break;
                };
                samples_processed += 1;

                let now = Instant::now();
                let SampleOutcome::Evaluated(eval) = detector.handle_sample(sample.reading, now.into_std()) else {
                    continue;
                };
                if !eval.triggered {
                    continue;
                }

                if let Some(cooldown) = eval.cooldown {
                    cooldown_until = Some(now + cooldown);
                }

                let count = triggers.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::info!(
                    count,
                    seq = sample.seq,
                    magnitude = eval.magnitude,
                    turn = eval.turn,
                    "Shake detected"
                );
                callback();
            }
        }
    }

    tracing::info!(samples_processed, "Shake detector stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaker_motion::{ChannelSource, MotionReading, NullSource};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_callback() -> (ShakeCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let callback: ShakeCallback = Arc::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    /// Let the detector task drain the bus.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_create_without_runtime_is_inert() {
        let source = ChannelSource::new();
        let (callback, count) = counting_callback();

        let handle = create(callback, None, &source);

        assert!(!handle.is_active());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        // Subscription is left for a later attempt
        assert!(source.subscribe().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_source_never_fires() {
        let (callback, count) = counting_callback();
        let handle = create(callback, None, &NullSource);

        assert!(!handle.is_active());
        assert_eq!(handle.config(), &ShakeConfig::default());
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_detector_on_same_source_is_inert() {
        let source = ChannelSource::new();
        let (callback, _) = counting_callback();

        let first = create(Arc::clone(&callback), None, &source);
        let second = create(callback, None, &source);

        assert!(first.is_active());
        assert!(!second.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shake_fires_callback_and_cools_down() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let (callback, count) = counting_callback();

        let options = ShakeOptions {
            forbid: Some(500.0),
            ..Default::default()
        };
        let handle = create(callback, Some(options), &source);
        assert!(handle.is_active());

        sender.send(MotionReading::new(0.0, 0.0, 0.0));
        settle().await;

        time::advance(Duration::from_millis(150)).await;
        sender.send(MotionReading::new(60.0, 40.0, 0.0));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handle.triggers(), 1);

        // Inside the cooldown window
        time::advance(Duration::from_millis(200)).await;
        sender.send(MotionReading::new(-60.0, -40.0, 0.0));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Cooldown over
        time::advance(Duration::from_millis(400)).await;
        settle().await;
        sender.send(MotionReading::new(-60.0, -40.0, 0.0));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_detaches() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let (callback, count) = counting_callback();

        let handle = create(callback, None, &source);
        sender.send(MotionReading::new(0.0, 0.0, 0.0));
        settle().await;

        handle.dispose();
        settle().await;

        assert!(!handle.is_active());
        assert!(sender.is_closed());

        time::advance(Duration::from_millis(150)).await;
        assert!(!sender.send(MotionReading::new(60.0, 40.0, 0.0)));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_during_cooldown() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let (callback, count) = counting_callback();

        let handle = create(callback, None, &source);
        sender.send(MotionReading::new(0.0, 0.0, 0.0));
        settle().await;
        time::advance(Duration::from_millis(150)).await;
        sender.send(MotionReading::new(60.0, 40.0, 0.0));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(handle);
        settle().await;
        time::advance(Duration::from_millis(2000)).await;
        settle().await;

        assert!(sender.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bus_closed_stops_detector() {
        let source = ChannelSource::new();
        let (callback, _) = counting_callback();

        let handle = create(callback, None, &source);
        assert!(handle.is_active());

        drop(source);
        settle().await;

        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_stops_detector() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let (callback, _) = counting_callback();

        drop(create(callback, None, &source));
        settle().await;

        assert!(sender.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_callback_clears_running() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let callback: ShakeCallback = Arc::new(|| panic!("callback failed"));

        let handle = create(callback, None, &source);
        assert!(handle.is_active());

        sender.send(MotionReading::new(0.0, 0.0, 0.0));
        settle().await;
        time::advance(Duration::from_millis(150)).await;
        sender.send(MotionReading::new(60.0, 40.0, 0.0));
        settle().await;

        assert!(!handle.is_active());
        assert_eq!(handle.triggers(), 1);
        assert!(sender.is_closed());
    }
}
