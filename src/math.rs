//! # Math — Sign, Extremum and Modular Exponentiation Helpers
//!
//! Thin operations over `rug::Integer` that take borrowed inputs and return
//! owned results.
//!
//! ## Algorithm: Right-to-Left Binary Exponentiation
//!
//! `pow_mod` scans the exponent from its least significant bit. Each step
//! multiplies the running result by the current base when the bit is set,
//! then squares the base. Both products are reduced by the modulus, so no
//! operand grows past the modulus size and the loop runs O(log e) times.
//!
//! Reduction uses the truncating remainder: for a negative base the result
//! carries the sign of the product, matching `Integer % Integer`.

use crate::constants::constant;
use crate::error::MathError;
use rug::Integer;
use std::cmp::Ordering;
use tracing::trace;

/// Absolute value.
pub fn abs(n: &Integer) -> Integer {
    if n.cmp0() == Ordering::Less {
        Integer::from(-n)
    } else {
        n.clone()
    }
}

/// Smallest of `values`. Ties keep the first occurrence.
pub fn min(values: &[Integer]) -> Result<Integer, MathError> {
    extremum(values, Ordering::Less, "min")
}

/// Largest of `values`. Ties keep the first occurrence.
pub fn max(values: &[Integer]) -> Result<Integer, MathError> {
    extremum(values, Ordering::Greater, "max")
}

fn extremum(values: &[Integer], keep: Ordering, name: &str) -> Result<Integer, MathError> {
    let (first, rest) = values
        .split_first()
        .ok_or_else(|| MathError::invalid(format!("{} needs at least one value", name)))?;
    let best = rest
        .iter()
        .fold(first, |acc, cur| if cur.cmp(acc) == keep { cur } else { acc });
    Ok(best.clone())
}

/// `base^exponent mod modulus` by square-and-multiply.
///
/// # Errors
///
/// `PreconditionViolation` if `exponent` is negative or `modulus` is zero.
pub fn pow_mod(base: &Integer, exponent: &Integer, modulus: &Integer) -> Result<Integer, MathError> {
    if exponent.cmp0() == Ordering::Less {
        return Err(MathError::precondition("exponent must be non-negative"));
    }
    if modulus.cmp0() == Ordering::Equal {
        return Err(MathError::precondition("modulus must be non-zero"));
    }
    trace!(
        base_bits = base.significant_bits(),
        exp_bits = exponent.significant_bits(),
        mod_bits = modulus.significant_bits(),
        "pow_mod"
    );

    let mut result = Integer::from(&*constant(1));
    let mut base = base.clone();
    let mut exp = exponent.clone();
    while exp.cmp0() == Ordering::Greater {
        if exp.is_odd() {
            result *= &base;
            result %= modulus;
        }
        exp >>= 1u32;
        // The last squaring would be discarded
        if exp.cmp0() == Ordering::Greater {
            base.square_mut();
            base %= modulus;
        }
    }
    // 1 mod ±1 is 0; the loop never reduces when the exponent is zero
    if exponent.cmp0() == Ordering::Equal {
        result %= modulus;
    }
    Ok(result)
}
