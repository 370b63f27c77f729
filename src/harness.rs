//! # Harness — Repeated Uniformity Trials
//!
//! Draws `samples` values from one sampler, scores them with
//! [`chi_squared`] over `round(sqrt(samples))` bins and compares against the
//! critical value for the configured significance. A single trial at 5%
//! rejects a perfect sampler one time in twenty, so the harness runs several
//! independently seeded trials and reports how many passed.
//!
//! Trials run on the rayon pool. Trial `i` owns a `ChaCha8Rng` seeded with
//! `seed + i`, so a report is reproducible from its base seed regardless of
//! thread count.

use crate::chi_squared::{bin_count, chi_squared, critical_value, ChiSquaredSummary};
use crate::config::HarnessConfig;
use crate::error::MathError;
use crate::progress::Progress;
use crate::random::Strategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rug::Integer;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    pub trial: u32,
    pub seed: u64,
    pub passed: bool,
    pub chi_squared: ChiSquaredSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub strategy: Strategy,
    pub min: String,
    pub max: String,
    pub samples: usize,
    pub bins: u32,
    pub significance: f64,
    pub critical_value: f64,
    pub seed: u64,
    pub passed: u32,
    pub trials: Vec<TrialResult>,
}

impl HarnessReport {
    pub fn pass_rate(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.passed as f64 / self.trials.len() as f64
    }
}

/// Run `config.trials` uniformity trials of `config.strategy` over `[min, max]`.
///
/// # Errors
///
/// `InvalidArgument` for an empty range, zero trials, too few samples to
/// form two bins, or a range whose remainder would overfill the last bin.
pub fn run(min: &Integer, max: &Integer, config: &HarnessConfig) -> Result<HarnessReport, MathError> {
    if min > max {
        return Err(MathError::invalid(format!(
            "empty range: min {} exceeds max {}",
            min, max
        )));
    }
    if config.trials == 0 {
        return Err(MathError::invalid("at least one trial is required"));
    }
    let bins = bin_count(config.samples);
    if bins < 2 {
        return Err(MathError::invalid(format!(
            "{} samples give fewer than two bins",
            config.samples
        )));
    }
    check_span(min, max, config.samples, bins)?;
    let critical = critical_value(bins - 1, config.significance);
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        strategy = %config.strategy,
        samples = config.samples,
        trials = config.trials,
        bins,
        critical,
        seed,
        "starting uniformity trials"
    );

    let progress = Progress::new();
    let trials = (0..config.trials)
        .into_par_iter()
        .map(|trial| -> Result<TrialResult, MathError> {
            let trial_seed = seed.wrapping_add(trial as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(trial_seed);
            let sequence = (0..config.samples)
                .map(|_| config.strategy.sample(&mut rng, min, max))
                .collect::<Result<Vec<_>, _>>()?;
            let report = chi_squared(&sequence, bins)?;
            let passed = report.is_uniform(critical);
            debug!(
                trial,
                statistic = report.statistic_f64(),
                passed,
                "uniformity trial finished"
            );
            progress.record_trial(config.samples as u64, passed);
            Ok(TrialResult {
                trial,
                seed: trial_seed,
                passed,
                chi_squared: report.summary(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    progress.print_status();

    let passed = trials.iter().filter(|t| t.passed).count() as u32;
    Ok(HarnessReport {
        strategy: config.strategy,
        min: min.to_string(),
        max: max.to_string(),
        samples: config.samples,
        bins,
        significance: config.significance.level(),
        critical_value: critical,
        seed,
        passed,
        trials,
    })
}

/// Reject ranges whose width leaves a large remainder after splitting into
/// `bins` equal bins.
///
/// The validator folds the top `span mod bins` values into the last bin, so
/// that bin expects `1 + rem / bin_size` times its share even for a perfect
/// sampler. With `e = samples / bins` this adds roughly `e * (rem / bin_size)^2`
/// to the statistic; anything above one is treated as unusable.
fn check_span(min: &Integer, max: &Integer, samples: usize, bins: u32) -> Result<(), MathError> {
    let span = Integer::from(max - min) + 1u32;
    let bin_size = Integer::from(&span / bins);
    let rem = Integer::from(&span % bins);
    let inflation = Integer::from(rem.square_ref()) * samples as u64;
    let budget = Integer::from(bin_size.square_ref()) * bins;
    if inflation > budget {
        return Err(MathError::invalid(format!(
            "range of {} values leaves {} values to fold into the last of {} bins",
            span, rem, bins
        )));
    }
    Ok(())
}
