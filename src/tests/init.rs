use super::super::{BucketConfig, CreationError, Histogram};
use crate::tests::helpers::histo;

#[test]
fn unit_magnitude_0_geometry() {
    let h = histo(1, 1_i64 << 32, 3);
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(1024, h.sub_bucket_half_count);
    assert_eq!(10, h.sub_bucket_half_count_magnitude);
    assert_eq!(0, h.unit_magnitude);
    // sub_bucket_count = 2^11, so 2^11 << 22 is > the max of 2^32 for 23
    // buckets total
    assert_eq!(23, h.bucket_count());
    assert_eq!(24 * 1024, h.counts_len());
    assert_eq!(53, h.leading_zero_count_base);
}

#[test]
fn unit_magnitude_0_hour_geometry() {
    let h = histo(1, 3_600_000_000, 3);
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(22, h.bucket_count());
    assert_eq!(23 * 1024, h.counts_len());
}

#[test]
fn unit_magnitude_12_geometry() {
    let h = histo(1_i64 << 12, 1_i64 << 32, 3);
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(12, h.unit_magnitude);
    // sub_bucket_count = 2^11; with the unit shift that is 2^23, and
    // 2^23 << 10 is > the max of 2^32 for 11 buckets total
    assert_eq!(11, h.bucket_count());
    assert_eq!(12 * 1024, h.counts_len());
}

#[test]
fn unit_magnitude_51_is_max_for_3_sig_figs() {
    let h = histo(1_i64 << 51, i64::MAX, 3);
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(51, h.unit_magnitude);
    // 2048 << 51 already exceeds half of i64::MAX, so one more bucket
    // reaches the top of the value space
    assert_eq!(2, h.bucket_count());
}

#[test]
fn unit_magnitude_52_sig_figs_3_err() {
    assert_eq!(
        CreationError::CannotRepresentSigFigBeyondLow,
        Histogram::new_with_bounds(1_i64 << 52, i64::MAX, 3).unwrap_err()
    );
}

#[test]
fn sub_bucket_counts_per_sig_figs() {
    assert_eq!(32, histo(1, 1000, 1).sub_bucket_count);
    assert_eq!(256, histo(1, 1000, 2).sub_bucket_count);
    assert_eq!(2048, histo(1, 10_000, 3).sub_bucket_count);
    assert_eq!(32_768, histo(1, 100_000, 4).sub_bucket_count);
    assert_eq!(262_144, histo(1, 1_000_000, 5).sub_bucket_count);
}

#[test]
fn config_matches_histogram_geometry() {
    let cfg = BucketConfig::new(1, 3_600_000_000, 3).unwrap();
    let h = Histogram::from_config(&cfg).unwrap();
    assert_eq!(cfg.counts_len(), h.counts_len());
    assert_eq!(cfg.lowest_trackable(), h.lowest_trackable());
    assert_eq!(cfg.highest_trackable(), h.highest_trackable());
    assert_eq!(cfg.significant_figures(), h.significant_figures());
    assert_eq!(h.total(), 0);
}

#[test]
fn empty_sentinels() {
    let h = histo(1, 100_000, 3);
    assert_eq!(0, h.min());
    assert_eq!(i64::MAX, h.min_nz());
    assert_eq!(0, h.max());
    assert_eq!(0, h.total());
}

#[test]
fn memory_size_includes_counts() {
    let h = histo(1, 3_600_000_000, 3);
    assert!(h.memory_size() > h.counts_len() * std::mem::size_of::<i64>());
}
