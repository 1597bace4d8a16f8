//! End-to-end scenarios driven through the public API only.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use stream_quantiles::{Biased, Estimator, Targeted};

fn normal_stream(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn sorted(mut data: Vec<f64>) -> Vec<f64> {
    data.sort_unstable_by(f64::total_cmp);
    data
}

#[test]
fn ordered_stream_hits_the_median_window() {
    let mut est = Estimator::new(Targeted::new(&[(0.5, 0.01)]).unwrap());
    for i in 1..=1000 {
        est.add(f64::from(i));
    }

    let median = est.get(0.5);
    assert!(
        (490.0..=510.0).contains(&median),
        "median estimate {} outside the 1% rank window",
        median
    );
}

#[test]
fn normal_stream_tail_matches_the_z_score() {
    let mut est = Estimator::new(Targeted::new(&[(0.99, 0.001)]).unwrap());
    for v in normal_stream(100_000, 1972) {
        est.add(v);
    }

    let p99 = est.get(0.99);
    assert!(
        (p99 - 2.326).abs() <= 0.1,
        "p99 estimate {} too far from the standard normal z-score",
        p99
    );
}

#[test]
fn biased_stream_stays_within_relative_rank_error() {
    let n = 10_000usize;
    let mut rng = StdRng::seed_from_u64(1972);
    let data: Vec<f64> = (0..n)
        .map(|_| f64::from(rng.random_range(0u32..=1_000_000)))
        .collect();

    let mut est = Estimator::new(Biased::new(0.01).unwrap());
    for &v in &data {
        est.add(v);
    }
    let estimate = est.get(0.99);

    let data = sorted(data);
    let want = (0.99 * n as f64) as usize;
    let allow = (0.01 * want as f64) as usize + 3;

    // The estimate is a real sample; its feasible rank interval must
    // intersect the allowed window around the requested rank.
    let rank_lo = data.partition_point(|x| *x < estimate) + 1;
    let rank_hi = data.partition_point(|x| *x <= estimate);
    assert!(
        rank_hi + allow >= want && rank_lo <= want + allow,
        "estimate {} has rank [{}, {}], want {} +/- {}",
        estimate,
        rank_lo,
        rank_hi,
        want,
        allow
    );
}

#[test]
fn one_sample_is_its_own_quantile() {
    let mut est = Estimator::new(Targeted::new(&[(0.5, 0.01)]).unwrap());
    est.add(42.0);
    assert_eq!(est.get(0.5), 42.0);
}

#[test]
fn tiny_buffer_flushes_exactly_once() {
    let mut est = Estimator::with_config(Biased::new(0.001).unwrap(), 4, 16).unwrap();
    for i in 1..=4 {
        est.add(f64::from(i));
    }

    // The fourth add filled the buffer: everything is merged already.
    assert_eq!(est.count(), 4);
    assert_eq!(est.items(), 4);
    assert_eq!(est.get(0.5), 2.0);
    assert_eq!(est.items(), 4);
}

#[test]
fn two_targets_hold_simultaneously() {
    let mut est =
        Estimator::new(Targeted::new(&[(0.5, 0.05), (0.99, 0.001)]).unwrap());
    for v in normal_stream(100_000, 27) {
        est.add(v);
    }

    let median = est.get(0.5);
    let p99 = est.get(0.99);
    assert!(
        median.abs() <= 0.2,
        "median estimate {} outside the 5% rank window",
        median
    );
    assert!(
        (p99 - 2.326).abs() <= 0.1,
        "p99 estimate {} outside the 0.1% rank window",
        p99
    );
}

#[test]
fn quantile_extremes_track_the_observed_range() {
    let n = 10_000usize;
    let mut rng = StdRng::seed_from_u64(9);
    let data: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();

    let mut est = Estimator::new(Biased::new(0.001).unwrap());
    for &v in &data {
        est.add(v);
    }

    let data = sorted(data);
    assert_eq!(est.get(0.0), data[0]);

    let top = est.get(1.0);
    assert!(top <= data[n - 1]);
    assert!(top >= data[n - 1 - 25]);
}

#[test]
fn queries_are_stable_between_adds() {
    let mut est = Estimator::new(Biased::new(0.01).unwrap());
    for v in normal_stream(5_000, 3) {
        est.add(v);
    }
    assert_eq!(est.get(0.75), est.get(0.75));
}

#[test]
fn empty_estimator_answers_zero() {
    let mut est = Estimator::new(Targeted::new(&[(0.9, 0.01)]).unwrap());
    assert_eq!(est.get(0.9), 0.0);
}
