//! # Random — Uniform Integers in an Inclusive Range
//!
//! Three samplers over `[min, max]`, each taking the entropy source as a
//! `rand::Rng` so callers choose between `thread_rng()` and a seeded stream.
//!
//! | Sampler        | Method                         | Uniformity                       |
//! |----------------|--------------------------------|----------------------------------|
//! | `random`       | `floor(u * (range + 1))`       | exact only below 2^53            |
//! | `random_bytes` | byte draw scaled by division   | small truncation bias, any width |
//! | `random_exact` | bit draw with rejection        | exact, any width                 |
//!
//! ## Float Precision Boundary
//!
//! `random` draws one `f64` in `[0, 1)`, which carries [`FLOAT_PRECISION_BITS`]
//! bits of mantissa. Ranges wider than that still return in-range values but
//! can no longer reach every integer.
//!
//! ## Byte Scaling
//!
//! `random_bytes` draws `ceil(bits(range) / 8)` bytes, reads them big-endian
//! into `r` in `[0, 2^(8·bytes) - 1]`, then maps linearly with
//! `r * range / (2^(8·bytes) - 1)`. No modulo is taken, so small residues are
//! not favoured; the truncating division instead under-weights `range` itself,
//! which is only hit when every drawn bit is set. `random_exact` removes that
//! bias by discarding draws above `range`.

use crate::error::MathError;
use rand::Rng;
use rug::integer::Order;
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Mantissa width of the `f64` driving [`random`].
pub const FLOAT_PRECISION_BITS: u32 = f64::MANTISSA_DIGITS;

/// Width of `max - min`, after checking that the range is well-formed.
fn span(min: &Integer, max: &Integer) -> Result<Integer, MathError> {
    if min > max {
        return Err(MathError::invalid(format!(
            "empty range: min {} exceeds max {}",
            min, max
        )));
    }
    Ok(Integer::from(max - min))
}

/// Fill `bytes` random bytes and read them as a big-endian unsigned integer.
fn draw_bytes<R: Rng + ?Sized>(rng: &mut R, bytes: usize) -> Integer {
    let mut buf = vec![0u8; bytes];
    rng.fill_bytes(&mut buf);
    Integer::from_digits(&buf, Order::Msf)
}

/// Float-scaled sample from `[min, max]`.
///
/// # Errors
///
/// `InvalidArgument` if `min > max`, or if the range is too wide to be
/// represented as an `f64` at all.
pub fn random<R: Rng + ?Sized>(rng: &mut R, min: &Integer, max: &Integer) -> Result<Integer, MathError> {
    let range = span(min, max)?;
    if range.cmp0() == Ordering::Equal {
        return Ok(min.clone());
    }
    let width = Integer::from(&range + 1u32);
    if width.significant_bits() > FLOAT_PRECISION_BITS {
        debug!(
            bits = width.significant_bits(),
            limit = FLOAT_PRECISION_BITS,
            "range exceeds float precision, not every value is reachable"
        );
    }
    let width = width.to_f64();
    if !width.is_finite() {
        return Err(MathError::invalid(
            "range does not fit in an f64, use random_bytes",
        ));
    }

    let u: f64 = rng.gen();
    let mut offset = Integer::from_f64((u * width).floor())
        .ok_or_else(|| MathError::invalid("scaled sample is not finite"))?;
    // u * width can round up to width when width is not exactly representable
    if offset > range {
        offset = range;
    }
    Ok(offset + min)
}

/// Byte-scaled sample from `[min, max]`, for ranges of any width.
///
/// # Errors
///
/// `InvalidArgument` if `min > max`.
pub fn random_bytes<R: Rng + ?Sized>(
    rng: &mut R,
    min: &Integer,
    max: &Integer,
) -> Result<Integer, MathError> {
    let range = span(min, max)?;
    if range.cmp0() == Ordering::Equal {
        return Ok(min.clone());
    }
    let bytes = (range.significant_bits() as usize + 7) / 8;
    let max_possible = (Integer::from(1) << (8 * bytes) as u32) - 1u32;

    let mut r = draw_bytes(rng, bytes);
    r *= &range;
    r /= &max_possible;
    Ok(r + min)
}

/// Exactly uniform sample from `[min, max]` by rejection.
///
/// Draws `bits(range)` random bits until the value is at most `range`. Each
/// draw is accepted with probability above one half.
///
/// # Errors
///
/// `InvalidArgument` if `min > max`.
pub fn random_exact<R: Rng + ?Sized>(
    rng: &mut R,
    min: &Integer,
    max: &Integer,
) -> Result<Integer, MathError> {
    let range = span(min, max)?;
    if range.cmp0() == Ordering::Equal {
        return Ok(min.clone());
    }
    let bits = range.significant_bits();
    let bytes = (bits as usize + 7) / 8;
    loop {
        let mut r = draw_bytes(rng, bytes);
        r.keep_bits_mut(bits);
        if r <= range {
            return Ok(r + min);
        }
    }
}

/// Sampler selection by name, for callers that pick one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One f64 draw, scaled (exact below 2^53)
    Float,
    /// Byte draw, scaled by division
    Bytes,
    /// Bit draw with rejection
    Exact,
}

impl Strategy {
    pub fn sample<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        min: &Integer,
        max: &Integer,
    ) -> Result<Integer, MathError> {
        match self {
            Strategy::Float => random(rng, min, max),
            Strategy::Bytes => random_bytes(rng, min, max),
            Strategy::Exact => random_exact(rng, min, max),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Float => write!(f, "float"),
            Strategy::Bytes => write!(f, "bytes"),
            Strategy::Exact => write!(f, "exact"),
        }
    }
}
