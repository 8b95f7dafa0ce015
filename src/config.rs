//! Bucket geometry, derived once at construction time.

use crate::core::errors::CreationError;

/// The bucket geometry of a histogram, derived from the trackable value
/// range and the requested precision.
///
/// All of a histogram's index math is a pure function of these fields.
/// Callers that construct many histograms with the same parameters can
/// compute the config once and hand it to [`Histogram::from_config`],
/// skipping the validation and derivation on each construction.
///
/// [`Histogram::from_config`]: crate::Histogram::from_config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketConfig {
    pub(crate) lowest_trackable_value: i64,
    pub(crate) highest_trackable_value: i64,
    pub(crate) significant_figures: u8,
    pub(crate) unit_magnitude: u32,
    pub(crate) sub_bucket_half_count_magnitude: u32,
    pub(crate) sub_bucket_count: u32,
    pub(crate) sub_bucket_half_count: u32,
    pub(crate) sub_bucket_mask: i64,
    pub(crate) bucket_count: u32,
    pub(crate) counts_len: usize,
}

impl BucketConfig {
    /// Validate `(lowest, highest, sig_figs)` and derive the geometry.
    ///
    /// `lowest` is the smallest value that needs to be distinguished from
    /// 0 and must be at least 1; `highest` must be at least `2 * lowest`;
    /// `sig_figs` is the number of significant decimal digits to preserve
    /// and must be between 1 and 5.
    pub fn new(lowest: i64, highest: i64, sig_figs: u8) -> Result<BucketConfig, CreationError> {
        if lowest < 1 {
            return Err(CreationError::LowIsZero);
        }
        if lowest > i64::MAX / 2 {
            return Err(CreationError::LowExceedsMax);
        }
        if highest < 2 * lowest {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        if !(1..=5).contains(&sig_figs) {
            return Err(CreationError::SigFigOutOfRange);
        }

        // Given 3 significant figures the expectation is +/- 1 unit at
        // 1000. It is also ok to be +/- 2 units at 2000, but NOT at 1999;
        // single-unit resolution must hold up to 2 * 10^sig_figs.
        let largest_value_with_single_unit_resolution = 2 * 10_i64.pow(u32::from(sig_figs));

        // Keep sub_bucket_count a power of two (for clean direct indexing)
        // that is large enough to cover single-unit resolution up to
        // largest_value_with_single_unit_resolution.
        let sub_bucket_count = (largest_value_with_single_unit_resolution as u64)
            .next_power_of_two() as u32;
        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_half_count_magnitude = sub_bucket_half_count.trailing_zeros();

        let unit_magnitude = 63 - lowest.leading_zeros();
        if unit_magnitude + sub_bucket_half_count_magnitude > 61 {
            return Err(CreationError::CannotRepresentSigFigBeyondLow);
        }

        let sub_bucket_mask = (i64::from(sub_bucket_count) - 1) << unit_magnitude;

        let bucket_count =
            buckets_needed_to_cover(highest, sub_bucket_count, unit_magnitude);
        let counts_len = (bucket_count as usize + 1)
            .checked_mul(sub_bucket_half_count as usize)
            .ok_or(CreationError::UsizeTypeTooSmall)?;

        Ok(BucketConfig {
            lowest_trackable_value: lowest,
            highest_trackable_value: highest,
            significant_figures: sig_figs,
            unit_magnitude,
            sub_bucket_half_count_magnitude,
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_mask,
            bucket_count,
            counts_len,
        })
    }

    /// The lowest value distinguishable from 0.
    pub fn lowest_trackable(&self) -> i64 {
        self.lowest_trackable_value
    }

    /// The highest value the geometry guarantees to cover.
    pub fn highest_trackable(&self) -> i64 {
        self.highest_trackable_value
    }

    /// The configured number of significant decimal digits.
    pub fn significant_figures(&self) -> u8 {
        self.significant_figures
    }

    /// The number of counter cells this geometry requires.
    pub fn counts_len(&self) -> usize {
        self.counts_len
    }
}

/// How many power-of-two buckets are needed so the top bucket covers
/// `value`. The k'th bucket expresses `0 * 2^k` to `sub_bucket_count *
/// 2^k` in units of `2^k`.
fn buckets_needed_to_cover(value: i64, sub_bucket_count: u32, unit_magnitude: u32) -> u32 {
    let mut smallest_untrackable_value = i64::from(sub_bucket_count) << unit_magnitude;

    // always need at least one bucket
    let mut buckets_needed = 1;
    while smallest_untrackable_value <= value {
        if smallest_untrackable_value > i64::MAX / 2 {
            // the next shift would overflow: that bucket already expresses
            // values past i64::MAX, so it must be the last one
            return buckets_needed + 1;
        }
        smallest_untrackable_value <<= 1;
        buckets_needed += 1;
    }
    buckets_needed
}
