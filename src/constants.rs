//! # Constants — Flyweight Cache for Hot Integer Values
//!
//! Maps a small native key to its `rug::Integer` representation and hands out
//! the same `Arc` on every later request, so values such as 0, 1, 2 or 128 are
//! allocated once per cache.
//!
//! ## Concurrency
//!
//! Entries sit behind an `RwLock`. Hits only take the read lock; a miss
//! upgrades to the write lock and re-checks before constructing, so two
//! threads racing on the same key still build it once. Entries are never
//! evicted: the key set is whatever callers request, not an open stream.
//!
//! A process-wide instance backs [`constant`]; it is warmed with `0..=3` on
//! first use.

use crate::error::MathError;
use rug::Integer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::trace;

/// Keys every cache is warmed with before it is handed out.
pub const WARM_KEYS: [i64; 4] = [0, 1, 2, 3];

pub struct ConstantCache {
    entries: RwLock<HashMap<i64, Arc<Integer>>>,
    constructions: AtomicU64,
}

impl ConstantCache {
    pub fn new() -> Self {
        ConstantCache {
            entries: RwLock::new(HashMap::new()),
            constructions: AtomicU64::new(0),
        }
    }

    /// Create a cache and populate it with `keys`.
    pub fn with_keys(keys: &[i64]) -> Self {
        let cache = Self::new();
        cache.warm(keys);
        cache
    }

    /// Construct every key that is not cached yet.
    pub fn warm(&self, keys: &[i64]) {
        for &key in keys {
            self.get(key);
        }
    }

    /// Return the cached representation of `key`, building it on first use.
    pub fn get(&self, key: i64) -> Arc<Integer> {
        if let Some(value) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(value);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let value = entries.entry(key).or_insert_with(|| {
            self.constructions.fetch_add(1, Ordering::Relaxed);
            trace!(key, "constructing constant");
            Arc::new(Integer::from(key))
        });
        Arc::clone(value)
    }

    /// Like [`get`](Self::get) for a float key. Non-finite, fractional or
    /// out-of-range values are rejected.
    pub fn get_f64(&self, value: f64) -> Result<Arc<Integer>, MathError> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(MathError::invalid(format!(
                "constant key {} is not an integer",
                value
            )));
        }
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if value < i64::MIN as f64 || value >= i64::MAX as f64 {
            return Err(MathError::invalid(format!(
                "constant key {} does not fit in 64 bits",
                value
            )));
        }
        Ok(self.get(value as i64))
    }

    pub fn contains(&self, key: i64) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of representations built since the cache was created.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }
}

impl Default for ConstantCache {
    fn default() -> Self {
        Self::new()
    }
}

fn global() -> &'static ConstantCache {
    static CACHE: OnceLock<ConstantCache> = OnceLock::new();
    CACHE.get_or_init(|| ConstantCache::with_keys(&WARM_KEYS))
}

/// Process-wide cached constant.
pub fn constant(key: i64) -> Arc<Integer> {
    global().get(key)
}
