//! Statistics queries over a loaded histogram: a hypothetical scenario of
//! 100 seconds of "perfect" 1 msec results sampled 100 times per second
//! (10,000 results), followed by a 100 second pause with a single (100
//! second) recorded result, with an expected interval between samples of
//! 10 msec.

use hdrhist::Histogram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

macro_rules! assert_near {
    ($a: expr, $b: expr, $tolerance: expr) => {{
        let a = $a as f64;
        let b = $b as f64;
        let tol = $tolerance as f64;
        assert!(
            (a - b).abs() <= b * tol,
            "assertion failed: `(left ~= right)` (left: `{}`, right: `{}`, tolerance: `{:.5}%`)",
            a,
            b,
            100.0 * tol
        );
    }};
}

const TRACKABLE_MAX: i64 = 3600 * 1000 * 1000;
const SIGFIG: u8 = 3;
const INTERVAL: i64 = 10_000; // 10 msec expected interval
const SCALE: i64 = 512;

struct Loaded {
    raw: Histogram,
    cor: Histogram,
    scaled_raw: Histogram,
    scaled_cor: Histogram,
}

fn load_histograms() -> Loaded {
    let raw = Histogram::new(TRACKABLE_MAX, SIGFIG).unwrap();
    let cor = Histogram::new(TRACKABLE_MAX, SIGFIG).unwrap();
    let scaled_raw = Histogram::new_with_bounds(1000, TRACKABLE_MAX * SCALE, SIGFIG).unwrap();
    let scaled_cor = Histogram::new_with_bounds(1000, TRACKABLE_MAX * SCALE, SIGFIG).unwrap();

    for _ in 0..10_000 {
        let v = 1000; // 1 msec
        raw.record(v).unwrap();
        cor.record_correct(v, INTERVAL).unwrap();

        scaled_raw.record(v * SCALE).unwrap();
        scaled_cor.record_correct(v * SCALE, INTERVAL * SCALE).unwrap();
    }

    let v = 100_000_000; // 100 sec
    raw.record(v).unwrap();
    cor.record_correct(v, INTERVAL).unwrap();

    scaled_raw.record(v * SCALE).unwrap();
    scaled_cor.record_correct(v * SCALE, INTERVAL * SCALE).unwrap();

    Loaded {
        raw,
        cor,
        scaled_raw,
        scaled_cor,
    }
}

#[test]
fn total_count() {
    let Loaded { raw, cor, .. } = load_histograms();

    assert_eq!(raw.total(), 10_001);
    assert_eq!(cor.total(), 20_000);
}

#[test]
fn get_max_value() {
    let Loaded { cor, .. } = load_histograms();

    assert!(cor.equivalent(cor.max(), 100_000_000));
}

#[test]
fn get_min_value() {
    let Loaded { cor, .. } = load_histograms();

    assert!(cor.equivalent(cor.min(), 1000));
    assert_eq!(cor.min(), 1000);
}

#[test]
fn get_mean() {
    let Loaded { raw, cor, .. } = load_histograms();

    // direct avg. of raw results
    let expected_raw_mean = ((10_000.0 * 1000.0) + (1.0 * 100_000_000.0)) / 10_001.0;
    // avg. 1 msec for half the time, and 50 sec for the other half
    let expected_mean = (1000.0 + 50_000_000.0) / 2.0;

    // the mean should be accurate to ~3 decimal points (~0.1%)
    assert_near!(raw.mean(), expected_raw_mean, 0.001);
    assert_near!(cor.mean(), expected_mean, 0.001);
}

#[test]
fn get_stdev() {
    let Loaded { raw, cor, .. } = load_histograms();

    let expected_raw_mean: f64 = ((10_000.0 * 1000.0) + (1.0 * 100_000_000.0)) / 10_001.0;
    let expected_raw_stdev = (((10_000.0 * (1000_f64 - expected_raw_mean).powi(2))
        + (100_000_000_f64 - expected_raw_mean).powi(2))
        / 10_001.0)
        .sqrt();

    let expected_mean = (1000.0 + 50_000_000.0) / 2_f64;
    let mut expected_square_deviation_sum = 10_000.0 * (1000_f64 - expected_mean).powi(2);
    let mut value = 10_000_f64;
    while value <= 100_000_000.0 {
        expected_square_deviation_sum += (value - expected_mean).powi(2);
        value += 10_000.0;
    }
    let expected_stdev = (expected_square_deviation_sum / 20_000.0).sqrt();

    // the standard deviation should be accurate to ~3 decimal points (~0.1%)
    assert_near!(raw.stdev(), expected_raw_stdev, 0.001);
    assert_near!(cor.stdev(), expected_stdev, 0.001);
}

#[test]
fn get_value_at_percentile_raw() {
    let Loaded { raw, .. } = load_histograms();

    // 10,000 of 10,001 samples sit at 1 msec
    assert_near!(raw.value_at_percentile(30.0), 1000.0, 0.001);
    assert_near!(raw.value_at_percentile(99.0), 1000.0, 0.001);
    assert_near!(raw.value_at_percentile(99.99), 1000.0, 0.001);
    // only the top sample reaches the 100 sec result
    assert_near!(raw.value_at_percentile(99.999), 100_000_000.0, 0.001);
    assert_near!(raw.value_at_percentile(100.0), 100_000_000.0, 0.001);
}

#[test]
fn get_value_at_percentile_corrected() {
    let Loaded { cor, .. } = load_histograms();

    assert_near!(cor.value_at_percentile(30.0), 1000.0, 0.001);
    assert_near!(cor.value_at_percentile(50.0), 1000.0, 0.001);
    // the backfilled samples spread the upper half across the stall
    assert_near!(cor.value_at_percentile(75.0), 50_000_000.0, 0.001);
    assert_near!(cor.value_at_percentile(90.0), 80_000_000.0, 0.001);
    assert_near!(cor.value_at_percentile(99.0), 98_000_000.0, 0.001);
    assert_near!(cor.value_at_percentile(99.999), 100_000_000.0, 0.001);
    assert_near!(cor.value_at_percentile(100.0), 100_000_000.0, 0.001);
}

#[test]
fn scaling_equivalence() {
    let Loaded {
        raw,
        cor,
        scaled_raw,
        scaled_cor,
    } = load_histograms();

    // averages should scale
    assert_near!(cor.mean() * SCALE as f64, scaled_cor.mean(), 0.000001);
    // total counts should be the same
    assert_eq!(cor.total(), scaled_cor.total());
    assert_eq!(raw.total(), scaled_raw.total());
    // 99th percentiles should be equivalent after scaling
    assert_eq!(
        scaled_cor.highest_equivalent(cor.value_at_percentile(99.0) * SCALE),
        scaled_cor.highest_equivalent(scaled_cor.value_at_percentile(99.0))
    );
    // max should be equivalent
    assert_eq!(
        scaled_cor.highest_equivalent(cor.max() * SCALE),
        scaled_cor.max()
    );
}

#[test]
fn count_at_covers_each_recorded_level() {
    let Loaded { raw, cor, .. } = load_histograms();

    assert_eq!(raw.count_at(1000), 10_000);
    assert_eq!(raw.count_at(100_000_000), 1);

    // corrected data backfills one sample per missed 10 msec interval
    assert_eq!(cor.count_at(1000), 10_000);
    assert_eq!(cor.count_at(10_000), 1);
    for value in (10_000..100_000).step_by(10_000) {
        assert_eq!(cor.count_at(value), 1, "at value {}", value);
    }
}

#[test]
fn random_values_round_trip_within_precision() {
    let h = Histogram::new(TRACKABLE_MAX, SIGFIG).unwrap();
    let mut rng = StdRng::seed_from_u64(0x1234_5678);

    for _ in 0..10_000 {
        let v = rng.gen_range(1..TRACKABLE_MAX);
        h.record(v).unwrap();

        assert!(h.count_at(v) >= 1);
        let low = h.lowest_equivalent(v);
        let high = h.highest_equivalent(v);
        assert!(low <= v && v <= high);

        // quantization error is bounded by the configured precision
        let range = h.equivalent_range_len(v);
        assert!(
            range == 1 || (range as f64) / (v as f64) <= 1e-3,
            "range {} too wide at value {}",
            range,
            v
        );
    }

    assert_eq!(h.total(), 10_000);
    let sum: i64 = h.iter_recorded().map(|iv| iv.count_at_value()).sum();
    assert_eq!(sum, 10_000);
}
