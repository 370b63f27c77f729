//! # Main — CLI Entry Point
//!
//! Routes subcommands to the library operations. Every integer argument is
//! parsed as an arbitrary-precision decimal and may be negative.
//!
//! ## Global Options
//!
//! - `--config` / `BIGMATH_CONFIG`: TOML file (default modulus, warm keys,
//!   harness defaults).
//! - `--seed` / `BIGMATH_SEED`: seed for `random` and `uniformity`; drawn from
//!   the OS when absent.
//! - `--json`: machine-readable output on stdout.
//! - `--threads`: rayon pool size for uniformity trials (defaults to all cores).
//!
//! Logs go to stderr: `LOG_FORMAT=json` for JSON lines, `RUST_LOG` for filtering.

mod cli;

use anyhow::Result;
use bigmath::{Significance, Strategy};
use clap::{Parser, Subcommand};
use rug::Integer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "bigmath",
    version,
    about = "Arbitrary-precision integer helpers and uniformity checks"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "BIGMATH_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the random generators (random when omitted)
    #[arg(long, env = "BIGMATH_SEED")]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cached representation of a constant key
    Constant {
        /// Integer key; fractional values are rejected
        #[arg(allow_hyphen_values = true)]
        key: String,
    },
    /// Absolute value
    Abs {
        #[arg(allow_hyphen_values = true)]
        value: Integer,
    },
    /// Smallest of the given values
    Min {
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<Integer>,
    },
    /// Largest of the given values
    Max {
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<Integer>,
    },
    /// Modular exponentiation base^exp mod modulus
    Pow {
        #[arg(long, allow_hyphen_values = true)]
        base: Integer,
        #[arg(long, allow_hyphen_values = true)]
        exp: Integer,
        /// Defaults to 2^default_modulus_bits from the configuration
        #[arg(long, allow_hyphen_values = true)]
        modulus: Option<Integer>,
    },
    /// Draw uniform integers from [min, max]
    Random {
        #[arg(long, allow_hyphen_values = true)]
        min: Integer,
        #[arg(long, allow_hyphen_values = true)]
        max: Integer,
        #[arg(long, value_enum, default_value_t = Strategy::Bytes)]
        strategy: Strategy,
        /// Number of values to draw
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Chi-squared uniformity trials for one generator over [min, max]
    Uniformity {
        #[arg(long, allow_hyphen_values = true)]
        min: Integer,
        #[arg(long, allow_hyphen_values = true)]
        max: Integer,
        /// Samples per trial (bins = round(sqrt(samples)))
        #[arg(long)]
        samples: Option<usize>,
        /// Independent trials
        #[arg(long)]
        trials: Option<u32>,
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        /// One of 0.1, 0.05, 0.01, 0.001
        #[arg(long)]
        significance: Option<Significance>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads);
    cli::run(&cli)
}
