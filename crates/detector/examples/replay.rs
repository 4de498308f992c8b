//! Example: replay a recorded motion session through the detector.
//!
//! Run with: cargo run -p shaker-detector --example replay -- session.ndjson [options.json]
//!
//! Reads the recording from stdin when no path is given. Timing comes from
//! the recording, so the replay runs as fast as the file can be read.

use std::fs::File;
use std::io::{self, BufReader};
use std::time::{Duration, Instant};

use anyhow::Context;
use shaker_detector::{SampleOutcome, ShakeConfig, ShakeDetector, ShakeOptions};
use shaker_motion::parse_recording;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shaker=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let recording_path = args.next();
    let options_path = args.next();

    let samples = match &recording_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            parse_recording(BufReader::new(file))?
        }
        None => parse_recording(io::stdin().lock())?,
    };

    let options = match &options_path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            ShakeOptions::from_json(&json)?
        }
        None => ShakeOptions::default(),
    };

    let config = ShakeConfig::from(options);
    tracing::info!(?config, samples = samples.len(), "Replaying recording");

    let mut detector = ShakeDetector::new(config);
    let start = Instant::now();
    let mut cooldown_until: Option<Instant> = None;
    let mut shakes = 0u64;

    for sample in &samples {
        let now = start + Duration::from_millis(sample.offset_ms);

        if cooldown_until.is_some_and(|until| now >= until) {
            cooldown_until = None;
            detector.end_cooldown();
        }

        if let SampleOutcome::Evaluated(eval) = detector.handle_sample(sample.reading(), now) {
            if eval.triggered {
                shakes += 1;
                cooldown_until = eval.cooldown.map(|cooldown| now + cooldown);
                println!(
                    "[{:>8} ms] shake #{} magnitude={:.1} turn={}",
                    sample.offset_ms, shakes, eval.magnitude, eval.turn
                );
            }
        }
    }

    println!("{shakes} shake(s) in {} samples", samples.len());
    Ok(())
}
