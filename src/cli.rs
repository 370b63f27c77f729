//! # CLI Execution Functions
//!
//! Execution logic for each subcommand, kept out of `main.rs`. Results go to
//! stdout, plain or as JSON; diagnostics go through `tracing` to stderr.

use anyhow::{Context, Result};
use bigmath::{harness, BigMath, MathConfig, MathError};
use std::sync::Arc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rug::Integer;
use serde_json::json;
use tracing::{info, warn};

use super::{Cli, Commands};

/// Load the configuration file if one was given and apply CLI overrides.
fn load_config(cli: &Cli) -> Result<MathConfig> {
    let mut config = match &cli.config {
        Some(path) => MathConfig::load(path)?,
        None => MathConfig::default(),
    };
    if cli.seed.is_some() {
        config.harness.seed = cli.seed;
    }
    if let Commands::Uniformity {
        samples,
        trials,
        strategy,
        significance,
        ..
    } = &cli.command
    {
        if let Some(samples) = samples {
            config.harness.samples = *samples;
        }
        if let Some(trials) = trials {
            config.harness.trials = *trials;
        }
        if let Some(strategy) = strategy {
            config.harness.strategy = *strategy;
        }
        if let Some(significance) = significance {
            config.harness.significance = *significance;
        }
    }
    config.validate()?;
    Ok(config)
}

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Print a single integer result.
fn emit_value(cli: &Cli, op: &str, value: &Integer) {
    if cli.json {
        println!("{}", json!({ "op": op, "value": value.to_string() }));
    } else {
        println!("{}", value);
    }
}

/// Resolve a `constant` key. Integer text goes straight to the cache so keys
/// past 2^53 keep every digit; anything else must be an integral float.
fn lookup_constant(math: &BigMath, key: &str) -> Result<Arc<Integer>, MathError> {
    let key = key.trim();
    if let Ok(k) = key.parse::<i64>() {
        return Ok(math.constant(k));
    }
    let value: f64 = key
        .parse()
        .map_err(|_| MathError::InvalidArgument(format!("constant key {:?} is not a number", key)))?;
    math.cache().get_f64(value)
}

/// Dispatch the parsed command.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let math = BigMath::new(config)?;

    match &cli.command {
        Commands::Constant { key } => {
            let value = lookup_constant(&math, key)?;
            emit_value(cli, "constant", &value);
        }
        Commands::Abs { value } => emit_value(cli, "abs", &bigmath::abs(value)),
        Commands::Min { values } => emit_value(cli, "min", &bigmath::min(values)?),
        Commands::Max { values } => emit_value(cli, "max", &bigmath::max(values)?),
        Commands::Pow { base, exp, modulus } => {
            let value = math
                .pow(base, exp, modulus.as_ref())
                .context("pow failed")?;
            emit_value(cli, "pow", &value);
        }
        Commands::Random {
            min,
            max,
            strategy,
            count,
        } => run_random(cli, min, max, *strategy, *count)?,
        Commands::Uniformity { min, max, .. } => run_uniformity(cli, &math, min, max)?,
    }
    Ok(())
}

fn run_random(
    cli: &Cli,
    min: &Integer,
    max: &Integer,
    strategy: bigmath::Strategy,
    count: usize,
) -> Result<()> {
    let mut rng = rng_for(cli.seed);
    let values = (0..count)
        .map(|_| strategy.sample(&mut rng, min, max))
        .collect::<Result<Vec<_>, _>>()?;
    info!(%strategy, count, "drew random values");

    if cli.json {
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        println!(
            "{}",
            json!({ "op": "random", "strategy": strategy, "values": rendered })
        );
    } else {
        for v in &values {
            println!("{}", v);
        }
    }
    Ok(())
}

fn run_uniformity(cli: &Cli, math: &BigMath, min: &Integer, max: &Integer) -> Result<()> {
    let report = math.uniformity(min, max)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    // A correct generator fails a single trial at rate `significance`;
    // losing most trials means the distribution is off.
    if report.pass_rate() < 0.5 {
        anyhow::bail!(
            "uniformity rejected: {}/{} trials passed at significance {}",
            report.passed,
            report.trials.len(),
            report.significance
        );
    }
    Ok(())
}

fn print_report(report: &harness::HarnessReport) {
    println!(
        "strategy={} samples={} bins={} critical={:.3} (significance {}) seed={}",
        report.strategy,
        report.samples,
        report.bins,
        report.critical_value,
        report.significance,
        report.seed
    );
    for t in &report.trials {
        println!(
            "trial {:>3}  chi2={:>10.3}  folded={}  {}",
            t.trial,
            t.chi_squared.statistic,
            t.chi_squared.folded,
            if t.passed { "pass" } else { "FAIL" }
        );
    }
    println!("passed {}/{}", report.passed, report.trials.len());
}

/// Configure the rayon global thread pool size.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}
