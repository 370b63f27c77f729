//! Error taxonomy shared by every operation in the crate.
//!
//! Errors are surfaced synchronously to the caller and never retried. An
//! operation either returns a full result or fails without side effects.

/// Errors from big-integer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Malformed input: non-integral constant, `min > max`, empty argument
    /// list, zero bin count, empty or too narrow sample sequence.
    InvalidArgument(String),
    /// Caller broke an operation's precondition: negative exponent or zero modulus.
    PreconditionViolation(String),
    /// Fewer samples than bins, so the expected bin frequency is zero.
    InsufficientSamples { samples: usize, bins: u32 },
}

impl MathError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MathError::InvalidArgument(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        MathError::PreconditionViolation(msg.into())
    }
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            MathError::PreconditionViolation(msg) => write!(f, "precondition violated: {}", msg),
            MathError::InsufficientSamples { samples, bins } => write!(
                f,
                "expected bin frequency is zero: {} samples over {} bins",
                samples, bins
            ),
        }
    }
}

impl std::error::Error for MathError {}
