//! Structured error types for the Aster engine.
//!
//! Every error is a caller-correctable input error: the engine is pure and
//! deterministic, so there is nothing transient to retry. The API layer that
//! embeds the engine is responsible for translating these into user-facing
//! responses.

use thiserror::Error;

/// Unified error type for all Aster computations.
#[derive(Debug, Error)]
pub enum AsterError {
    /// A sample is below the minimum size a computation requires.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Paired inputs (before/after, x/y) have different lengths.
    #[error("mismatched lengths: {left} vs {right}")]
    MismatchedLengths { left: usize, right: usize },

    /// A configuration parameter is out of its valid range
    /// (alpha outside (0, 1), quantile outside [0, 1], zero resamples, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A numeric-only computation was given a column that fails the
    /// numeric-type heuristic.
    #[error("non-numeric data: {0}")]
    NonNumericData(String),

    /// An unknown test kind or an incoherent variable combination was
    /// requested from the advisor/runner dispatch.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
}

/// Convenience alias used throughout the Aster crates.
pub type Result<T> = std::result::Result<T, AsterError>;
