//! Configuration errors surfaced at construction time.
//!
//! The estimator itself performs no I/O and cannot partially fail, so
//! `add` and `get` are infallible. Everything that can go wrong is a
//! malformed configuration, rejected before an estimator exists.

use std::fmt;

/// Error returned by the invariant and estimator constructors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A target quantile φ was outside (0, 1).
    Quantile {
        /// The rejected quantile.
        phi: f64,
    },

    /// An error bound ε was outside its allowed range: ε must be finite,
    /// positive, and (for targeted invariants) below min(φ, 1 − φ).
    Epsilon {
        /// The rejected error bound.
        epsilon: f64,
    },

    /// A targeted invariant was constructed from an empty target set.
    EmptyTargets,

    /// A capacity was zero. Both the insertion buffer and the recycler
    /// must be able to hold at least one record.
    Capacity {
        /// Which capacity was rejected.
        what: &'static str,
        /// The rejected value.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Quantile { phi } => write!(
                f,
                "quantile target {} is out of range. \
                 hint: targets must satisfy 0 < phi < 1",
                phi
            ),
            ConfigError::Epsilon { epsilon } => write!(
                f,
                "error bound {} is out of range. \
                 hint: epsilon must be finite, positive, and below min(phi, 1 - phi)",
                epsilon
            ),
            ConfigError::EmptyTargets => write!(
                f,
                "targeted invariant needs at least one (phi, epsilon) pair"
            ),
            ConfigError::Capacity { what, got } => write!(
                f,
                "{} capacity {} is invalid. hint: capacities must be at least 1",
                what, got
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result alias for constructors in this crate.
pub type ConfigResult<T> = Result<T, ConfigError>;
