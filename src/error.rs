//! Error type shared by the GA engine and the driver-profile oracles.

use thiserror::Error;

/// Errors raised at construction boundaries or by a fitness oracle.
///
/// Randomized operator behavior never fails; every variant here is either a
/// configuration mistake or an oracle contract violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolveError {
    /// A genome does not have the bit length the caller expects.
    #[error("genome has {actual} bits, expected {expected}")]
    InvalidGenomeLength { expected: usize, actual: usize },

    /// A run parameter is outside its legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The fitness oracle failed to score a genome.
    #[error("fitness evaluation failed: {0}")]
    Oracle(String),

    /// The fitness oracle returned a negative or non-finite score.
    #[error("fitness oracle returned {0}, scores must be finite and non-negative")]
    InvalidScore(f64),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvolveError>;
