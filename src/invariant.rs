//! The invariant function f(r, n) that drives compression and queries.
//!
//! An invariant relates an item's rank `r` and the stream count `n` to the
//! rank error the summary is allowed to carry at that position. Two
//! constructions are provided. `Targeted` concentrates accuracy around a
//! discrete set of quantiles, which is the usual shape for latency
//! reporting ("the 50th within 1%, the 99th within 0.1%"). `Biased` spends
//! a single ε uniformly relative to rank, which keeps the guarantee tight
//! toward the upper tail without naming quantiles in advance.
//!
//! Both precompute their per-target coefficients at construction so the
//! value computed inside the merge and compress loops is straight-line
//! arithmetic.

use crate::error::{ConfigError, ConfigResult};

/// The allowed-rank-error function consulted by the summary.
///
/// Implementations must be pure: for a given `(rank, n)` the result never
/// changes. The summary treats the output as integral and compares it
/// against `g + Δ` sums directly.
pub trait Invariant {
    /// Maximum rank error tolerated for a tuple at cumulative rank `rank`
    /// when `n` observations have been merged.
    fn allowed(&self, rank: u64, n: u64) -> u64;
}

/// One compiled quantile target.
#[derive(Debug, Clone, Copy)]
struct Target {
    phi: f64,
    /// 2ε/(1−φ), applied while rank is at or below ⌊φ·n⌋.
    below: f64,
    /// 2ε/φ, applied above ⌊φ·n⌋.
    above: f64,
}

/// Invariant that is tightest near a fixed set of quantiles.
///
/// # Examples
/// ```
/// use stream_quantiles::{Invariant, Targeted};
///
/// let inv = Targeted::new(&[(0.99, 0.001)]).unwrap();
/// // Tight near the target, loose far below it.
/// assert!(inv.allowed(99_000, 100_000) < inv.allowed(50_000, 100_000));
/// ```
///
/// An empty target set is rejected:
/// ```
/// use stream_quantiles::Targeted;
///
/// assert!(Targeted::new(&[]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Targeted {
    targets: Vec<Target>,
}

impl Targeted {
    /// Compile a targeted invariant from `(phi, epsilon)` pairs.
    ///
    /// Each φ must lie in (0, 1) and each ε in (0, min(φ, 1 − φ)).
    pub fn new(targets: &[(f64, f64)]) -> ConfigResult<Targeted> {
        if targets.is_empty() {
            return Err(ConfigError::EmptyTargets);
        }
        let mut compiled = Vec::with_capacity(targets.len());
        for &(phi, epsilon) in targets {
            if !phi.is_finite() || phi <= 0.0 || phi >= 1.0 {
                return Err(ConfigError::Quantile { phi });
            }
            if !epsilon.is_finite() || epsilon <= 0.0 || epsilon >= phi.min(1.0 - phi) {
                return Err(ConfigError::Epsilon { epsilon });
            }
            compiled.push(Target {
                phi,
                below: 2.0 * epsilon / (1.0 - phi),
                above: 2.0 * epsilon / phi,
            });
        }
        Ok(Targeted { targets: compiled })
    }
}

impl Invariant for Targeted {
    fn allowed(&self, rank: u64, n: u64) -> u64 {
        let mut min = (n + 1) as f64;
        for target in &self.targets {
            let err = if rank <= (target.phi * n as f64) as u64 {
                target.below * (n - rank) as f64
            } else {
                target.above * rank as f64
            };
            if err < min {
                min = err;
            }
        }
        min as u64
    }
}

/// Invariant whose allowed rank error grows linearly with rank.
///
/// # Examples
/// ```
/// use stream_quantiles::{Biased, Invariant};
///
/// let inv = Biased::new(0.01).unwrap();
/// assert_eq!(inv.allowed(1_000, 100_000), 20);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Biased {
    two_epsilon: f64,
}

impl Biased {
    /// Build a biased invariant from a single error bound ε in (0, 1).
    pub fn new(epsilon: f64) -> ConfigResult<Biased> {
        if !epsilon.is_finite() || epsilon <= 0.0 || epsilon >= 1.0 {
            return Err(ConfigError::Epsilon { epsilon });
        }
        Ok(Biased {
            two_epsilon: 2.0 * epsilon,
        })
    }
}

impl Invariant for Biased {
    fn allowed(&self, rank: u64, _n: u64) -> u64 {
        (self.two_epsilon * rank as f64) as u64
    }
}
