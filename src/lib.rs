//! This crate provides approximate quantiles over unbounded data streams
//! in a moderate amount of memory.
//!
//! Exact order statistics over a stream require keeping the stream. The
//! estimator here instead maintains a compressed, sorted summary whose
//! size is sublinear in the stream length, and answers any quantile query
//! within an error bound the caller chooses up front: either a set of
//! individually-targeted quantiles ("the 99th within 0.1%") or a single
//! bound applied relative to rank. Samples pass through a small insertion
//! buffer and detached summary records are recycled, so the steady-state
//! allocation rate is flat.
//!
//! # Examples
//! ```
//! use stream_quantiles::{Estimator, Targeted};
//!
//! let targets = Targeted::new(&[(0.50, 0.01), (0.99, 0.001)])?;
//! let mut est = Estimator::new(targets);
//! for i in 1..=1000 {
//!     est.add(f64::from(i));
//! }
//!
//! let median = est.get(0.50);
//! assert!((488.0..=512.0).contains(&median));
//! # Ok::<(), stream_quantiles::ConfigError>(())
//! ```
//!
//! The estimator is a single-writer library primitive: it performs no
//! I/O, spawns nothing, and is not internally synchronized.

#![deny(missing_docs)]

pub mod ckms;
pub mod error;
pub mod invariant;

pub use crate::ckms::Estimator;
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::invariant::{Biased, Invariant, Targeted};
