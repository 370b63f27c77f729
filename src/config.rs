//! TOML configuration: default modulus size, cache warm-up keys and the
//! uniformity harness defaults.
//!
//! ```toml
//! default_modulus_bits = 1048575
//! warm_keys = [0, 1, 2, 3, 8, 20, 128]
//!
//! [harness]
//! samples = 1000
//! trials = 10
//! strategy = "bytes"
//! significance = 0.05
//! seed = 42
//! ```
//!
//! Every key is optional; missing keys take the defaults above (no seed).

use crate::chi_squared::Significance;
use crate::random::Strategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default modulus for `BigMath::pow` is `2^DEFAULT_MODULUS_BITS`.
pub const DEFAULT_MODULUS_BITS: u32 = (1 << 20) - 1;

/// Keys warmed into a `BigMath` cache when the config names none.
pub const DEFAULT_WARM_KEYS: [i64; 7] = [0, 1, 2, 3, 8, 20, 128];

fn default_modulus_bits() -> u32 {
    DEFAULT_MODULUS_BITS
}

fn default_warm_keys() -> Vec<i64> {
    DEFAULT_WARM_KEYS.to_vec()
}

fn default_samples() -> usize {
    1000
}

fn default_trials() -> u32 {
    10
}

fn default_strategy() -> Strategy {
    Strategy::Bytes
}

fn default_significance() -> Significance {
    Significance::P05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathConfig {
    #[serde(default = "default_modulus_bits")]
    pub default_modulus_bits: u32,
    #[serde(default = "default_warm_keys")]
    pub warm_keys: Vec<i64>,
    #[serde(default)]
    pub harness: HarnessConfig,
}

impl Default for MathConfig {
    fn default() -> Self {
        MathConfig {
            default_modulus_bits: default_modulus_bits(),
            warm_keys: default_warm_keys(),
            harness: HarnessConfig::default(),
        }
    }
}

/// The `[harness]` table: how uniformity trials are drawn and judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_trials")]
    pub trials: u32,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_significance")]
    pub significance: Significance,
    /// Base seed; trial `i` uses `seed + i`. Drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            samples: default_samples(),
            trials: default_trials(),
            strategy: default_strategy(),
            significance: default_significance(),
            seed: None,
        }
    }
}

impl MathConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: MathConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_modulus_bits == 0 {
            anyhow::bail!("default_modulus_bits must be positive");
        }
        self.harness.validate()
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            anyhow::bail!("harness.trials must be positive");
        }
        if self.samples < 4 {
            // Fewer than four samples cannot fill two bins
            anyhow::bail!("harness.samples must be at least 4, got {}", self.samples);
        }
        Ok(())
    }
}
