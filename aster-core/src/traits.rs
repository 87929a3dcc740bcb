//! Core trait definitions shared across the Aster crates.

/// A type that carries a primary numeric score (p-value, statistic, ...).
pub trait Scored {
    /// The score value.
    fn score(&self) -> f64;
}

/// A type that can produce a one-line human-readable summary.
pub trait Summarizable {
    /// A summary suitable for display in reports and logs.
    fn summary(&self) -> String;
}
