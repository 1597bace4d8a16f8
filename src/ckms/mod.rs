//! Streaming quantile estimation over biased and targeted invariants.
//!
//! This is an implementation of the sketch presented in Cormode, Korn,
//! Muthukrishnan, Srivastava's paper "Effective Computation of Biased
//! Quantiles over Data Streams". The ambition is to answer quantile
//! queries over a stream of samples without keeping the stream around:
//! the summary holds a sorted set of (value, rank increment, rank error)
//! tuples whose size is sublinear in the stream, and an invariant
//! function decides how much rank error each position may carry.
//!
//! We follow the batch method of the paper. Incoming samples collect in
//! a fixed-capacity buffer; once the buffer fills it is sorted and merged
//! into the summary in a single forward sweep, and a compression pass
//! then collapses every adjacent pair the invariant no longer needs.
//! Queries flush first, so they always observe the whole stream.
//!
//! The estimator is single-writer: nothing here is synchronized, and
//! callers sharing one instance across threads must wrap every operation
//! in their own mutual exclusion.

mod recycler;
mod summary;
mod tuple;

use crate::ckms::summary::Summary;
use crate::error::{ConfigError, ConfigResult};
use crate::invariant::Invariant;

/// Samples buffered before a flush when no capacity is given.
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Tuple records the recycler holds when no capacity is given.
pub const DEFAULT_RECYCLER_CAPACITY: usize = 1024;

/// A streaming quantile estimator with caller-chosen error guarantees.
///
/// An `Estimator` is built from an [`Invariant`]: [`Targeted`] for a
/// discrete set of quantiles of interest, [`Biased`] for a uniform
/// relative-rank guarantee. If the invariant promises ε at φ and `n`
/// samples have been added, `get(φ)` returns a value whose rank is
/// within ±εn of ⌊φ·n⌋.
///
/// [`Targeted`]: crate::invariant::Targeted
/// [`Biased`]: crate::invariant::Biased
pub struct Estimator<F> {
    buffer: Vec<f64>,
    buffer_capacity: usize,
    summary: Summary<F>,

    sum: Option<f64>,
    cma: Option<f64>,
    last_in: Option<f64>,
}

impl<F: Invariant> Estimator<F> {
    /// Create an estimator with the default buffer and recycler
    /// capacities.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.001).unwrap());
    /// for i in 1..=1000 {
    ///     est.add(f64::from(i));
    /// }
    /// assert_eq!(est.get(0.0), 1.0);
    /// assert_eq!(est.get(0.5), 500.0);
    /// assert_eq!(est.get(1.0), 1000.0);
    /// ```
    pub fn new(invariant: F) -> Estimator<F> {
        Self::build(invariant, DEFAULT_BUFFER_CAPACITY, DEFAULT_RECYCLER_CAPACITY)
    }

    /// Create an estimator with explicit buffer and recycler capacities.
    ///
    /// The buffer capacity trades write amortization against flush
    /// latency; the recycler capacity bounds how many detached tuple
    /// records are kept for reuse. Both must be at least 1.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// assert!(Estimator::with_config(Biased::new(0.01).unwrap(), 0, 16).is_err());
    /// assert!(Estimator::with_config(Biased::new(0.01).unwrap(), 64, 16).is_ok());
    /// ```
    pub fn with_config(
        invariant: F,
        buffer_capacity: usize,
        recycler_capacity: usize,
    ) -> ConfigResult<Estimator<F>> {
        if buffer_capacity == 0 {
            return Err(ConfigError::Capacity {
                what: "buffer",
                got: buffer_capacity,
            });
        }
        if recycler_capacity == 0 {
            return Err(ConfigError::Capacity {
                what: "recycler",
                got: recycler_capacity,
            });
        }
        Ok(Self::build(invariant, buffer_capacity, recycler_capacity))
    }

    fn build(invariant: F, buffer_capacity: usize, recycler_capacity: usize) -> Estimator<F> {
        Estimator {
            buffer: Vec::with_capacity(buffer_capacity),
            buffer_capacity,
            summary: Summary::new(invariant, recycler_capacity),
            sum: None,
            cma: None,
            last_in: None,
        }
    }

    /// Add a sample.
    ///
    /// Samples collect in the insertion buffer; a full buffer is sorted,
    /// merged into the summary, and compressed. Non-finite samples (NaN
    /// and ±∞) are discarded: the summary is ordered by `<`, and NaN has
    /// no position under it.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.01).unwrap());
    /// est.add(42.0);
    /// est.add(f64::NAN);
    /// assert_eq!(est.count(), 1);
    /// ```
    pub fn add(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        self.sum = Some(self.sum.map_or(v, |s| s + v));
        self.last_in = Some(v);
        self.buffer.push(v);
        let n = self.count() as f64;
        self.cma = Some(self.cma.map_or(v, |m| m + (v - m) / n));
        if self.buffer.len() == self.buffer_capacity {
            self.flush();
        }
    }

    /// Estimate the value at quantile `phi`.
    ///
    /// Buffered samples are flushed first, so the answer reflects every
    /// sample added so far. Returns 0.0 when nothing has been observed.
    /// `phi` is clamped into [0, 1]; passing a quantile outside that
    /// range is a caller bug and trips a debug assertion.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Estimator, Targeted};
    ///
    /// let mut est = Estimator::new(Targeted::new(&[(0.5, 0.01)]).unwrap());
    /// assert_eq!(est.get(0.5), 0.0);
    ///
    /// est.add(42.0);
    /// assert_eq!(est.get(0.5), 42.0);
    /// ```
    pub fn get(&mut self, phi: f64) -> f64 {
        debug_assert!((0.0..=1.0).contains(&phi), "quantile {} out of [0, 1]", phi);
        self.flush();
        self.summary.query(phi.clamp(0.0, 1.0))
    }

    /// Samples observed so far, including those still buffered.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.001).unwrap());
    /// for i in 0..1000 {
    ///     est.add(f64::from(i));
    /// }
    /// assert_eq!(est.count(), 1000);
    /// ```
    pub fn count(&self) -> u64 {
        self.summary.count() + self.buffer.len() as u64
    }

    /// Tuples currently held by the summary.
    ///
    /// Reflects merged state only; buffered samples do not appear until
    /// the next flush. Useful for watching how hard the compressor is
    /// working.
    pub fn items(&self) -> usize {
        self.summary.items()
    }

    /// True when no samples have been observed.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Sum of every accepted sample.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.1).unwrap());
    /// est.add(1.0);
    /// est.add(2.0);
    /// est.add(3.0);
    /// assert_eq!(est.sum(), Some(6.0));
    /// ```
    pub fn sum(&self) -> Option<f64> {
        self.sum
    }

    /// Cumulative moving average of every accepted sample.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.1).unwrap());
    /// est.add(0.0);
    /// est.add(100.0);
    /// assert_eq!(est.mean(), Some(50.0));
    /// ```
    pub fn mean(&self) -> Option<f64> {
        self.cma
    }

    /// The most recently accepted sample.
    ///
    /// # Examples
    /// ```
    /// use stream_quantiles::{Biased, Estimator};
    ///
    /// let mut est = Estimator::new(Biased::new(0.1).unwrap());
    /// est.add(1.0);
    /// est.add(2.0);
    /// assert_eq!(est.last(), Some(2.0));
    /// ```
    pub fn last(&self) -> Option<f64> {
        self.last_in
    }

    /// Sort, merge, compress, clear. Flushing an empty buffer leaves the
    /// summary untouched.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer.sort_unstable_by(f64::total_cmp);
        self.summary.merge(&self.buffer);
        self.summary.compress();
        self.buffer.clear();
    }
}
