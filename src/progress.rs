//! # Progress — Atomic Harness Counters
//!
//! Shared between rayon workers running uniformity trials. Samples drawn,
//! trials finished and trials passed are plain `AtomicU64` counters: each
//! worker bumps them independently and the totals are read once at the end.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub struct Progress {
    pub drawn: AtomicU64,
    pub trials: AtomicU64,
    pub passed: AtomicU64,
    start: Instant,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            drawn: AtomicU64::new(0),
            trials: AtomicU64::new(0),
            passed: AtomicU64::new(0),
            start: Instant::now(),
        })
    }

    /// Record one finished trial of `samples` draws.
    pub fn record_trial(&self, samples: u64, passed: bool) {
        self.drawn.fetch_add(samples, Ordering::Relaxed);
        self.trials.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.passed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let drawn = self.drawn.load(Ordering::Relaxed);
        let trials = self.trials.load(Ordering::Relaxed);
        let passed = self.passed.load(Ordering::Relaxed);
        let rate = if elapsed.as_secs_f64() > 0.0 {
            drawn as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        info!(
            drawn,
            trials,
            passed,
            rate = format_args!("{:.2}", rate),
            elapsed_ms = elapsed.as_millis() as u64,
            "uniformity progress"
        );
    }
}
