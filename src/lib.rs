pub mod chi_squared;
pub mod config;
pub mod constants;
pub mod error;
pub mod harness;
pub mod math;
pub mod progress;
pub mod random;

pub use chi_squared::{bin_count, chi_squared, critical_value, ChiSquaredReport, Significance};
pub use config::{HarnessConfig, MathConfig};
pub use constants::{constant, ConstantCache};
pub use error::MathError;
pub use math::{abs, max, min, pow_mod};
pub use random::{random, random_bytes, random_exact, Strategy, FLOAT_PRECISION_BITS};

use rug::Integer;
use std::sync::Arc;
use tracing::debug;

/// Configured entry point: owns a warmed constant cache and the default
/// modulus for [`BigMath::pow`], both built once in [`BigMath::new`].
pub struct BigMath {
    config: MathConfig,
    cache: ConstantCache,
    default_modulus: Integer,
}

impl BigMath {
    pub fn new(config: MathConfig) -> Result<Self, MathError> {
        if config.default_modulus_bits == 0 {
            return Err(MathError::invalid("default_modulus_bits must be positive"));
        }
        Ok(Self::build(config))
    }

    fn build(config: MathConfig) -> Self {
        let cache = ConstantCache::with_keys(&config.warm_keys);
        let default_modulus = Integer::from(&*cache.get(1)) << config.default_modulus_bits;
        debug!(
            modulus_bits = config.default_modulus_bits,
            cached = cache.len(),
            "bigmath context ready"
        );
        BigMath {
            config,
            cache,
            default_modulus,
        }
    }

    pub fn config(&self) -> &MathConfig {
        &self.config
    }

    pub fn cache(&self) -> &ConstantCache {
        &self.cache
    }

    /// `2^default_modulus_bits`.
    pub fn default_modulus(&self) -> &Integer {
        &self.default_modulus
    }

    pub fn constant(&self, key: i64) -> Arc<Integer> {
        self.cache.get(key)
    }

    /// `base^exponent mod modulus`, falling back to the default modulus.
    ///
    /// With the default modulus this is the plain power for any result
    /// narrower than `default_modulus_bits`.
    pub fn pow(
        &self,
        base: &Integer,
        exponent: &Integer,
        modulus: Option<&Integer>,
    ) -> Result<Integer, MathError> {
        pow_mod(base, exponent, modulus.unwrap_or(&self.default_modulus))
    }

    /// Uniformity trials over `[min, max]` with the configured harness settings.
    pub fn uniformity(&self, min: &Integer, max: &Integer) -> Result<harness::HarnessReport, MathError> {
        harness::run(min, max, &self.config.harness)
    }
}

impl Default for BigMath {
    fn default() -> Self {
        Self::build(MathConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::ops::Pow;

    #[test]
    fn default_modulus_is_configured_power_of_two() {
        let cfg = MathConfig {
            default_modulus_bits: 128,
            ..MathConfig::default()
        };
        let math = BigMath::new(cfg).unwrap();
        assert_eq!(*math.default_modulus(), Integer::from(1) << 128u32);
        assert_eq!(
            BigMath::default().default_modulus().significant_bits(),
            config::DEFAULT_MODULUS_BITS + 1
        );
    }

    #[test]
    fn pow_without_modulus_is_plain_power() {
        let math = BigMath::default();
        for i in 0u32..100 {
            let n = Integer::from(i);
            assert_eq!(
                math.pow(&n, &Integer::from(2), None).unwrap(),
                Integer::from(i).pow(2u32)
            );
            assert_eq!(
                math.pow(&Integer::from(2), &n, None).unwrap(),
                Integer::from(2).pow(i)
            );
        }
        let big = math.pow(&Integer::from(2), &Integer::from(1024), None).unwrap();
        assert_eq!(big, Integer::from(1) << 1024u32);
    }

    #[test]
    fn pow_with_modulus() {
        let math = BigMath::default();
        let five = Integer::from(5);
        assert_eq!(
            math.pow(&Integer::from(3), &Integer::from(4), Some(&five)).unwrap(),
            1
        );
    }

    #[test]
    fn small_default_modulus_wraps() {
        let config = MathConfig {
            default_modulus_bits: 8,
            ..MathConfig::default()
        };
        let math = BigMath::new(config).unwrap();
        // 2^10 mod 2^8 = 0, 3^5 = 243 < 256
        assert_eq!(math.pow(&Integer::from(2), &Integer::from(10), None).unwrap(), 0);
        assert_eq!(math.pow(&Integer::from(3), &Integer::from(5), None).unwrap(), 243);
    }

    #[test]
    fn warm_keys_come_from_config() {
        let config = MathConfig {
            warm_keys: vec![8, 20, 128],
            ..MathConfig::default()
        };
        let math = BigMath::new(config).unwrap();
        assert!(math.cache().contains(128));
        let before = math.cache().constructions();
        assert_eq!(*math.constant(20), 20);
        assert_eq!(math.cache().constructions(), before);
    }

    #[test]
    fn zero_modulus_bits_is_rejected() {
        let config = MathConfig {
            default_modulus_bits: 0,
            ..MathConfig::default()
        };
        assert!(matches!(
            BigMath::new(config),
            Err(MathError::InvalidArgument(_))
        ));
    }
}
