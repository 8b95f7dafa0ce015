//! A High Dynamic Range (HDR) histogram: recording and analyzing of sampled
//! value counts across a configurable integer value range, with configurable
//! value precision within the range. Precision is expressed as a number of
//! significant decimal digits, and bounds the quantization error at every
//! scale, which makes the histogram suitable for data with non-normal,
//! long-tailed distributions, latency above all.
//!
//! For example, a histogram can track observed integer values between 1 and
//! 3,600,000,000 while maintaining precision of 3 significant digits across
//! that range. Value quantization will then be no coarser than 1/1,000th of
//! any value. Such a histogram could track response times from 1 microsecond
//! to 1 hour, resolving 1 microsecond up to 1 millisecond, 1 millisecond (or
//! better) up to one second, and so on, staying within 3.6 seconds at the
//! full 1 hour.
//!
//! The memory footprint is fixed at construction: it depends only on the
//! chosen range and precision, never on how many samples are recorded.
//! Recording is constant-time and lock-free: every counter is an atomic
//! cell, so any number of threads may record into a shared histogram through
//! `&self`:
//!
//! ```
//! use hdrhist::Histogram;
//! use std::sync::Arc;
//!
//! let hist = Arc::new(Histogram::new_with_bounds(1, 60 * 60 * 1000, 2).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let h = Arc::clone(&hist);
//!         std::thread::spawn(move || {
//!             for _ in 0..1000 {
//!                 h.record(54321).expect("value is in range");
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(hist.total(), 4000);
//! ```
//!
//! # Querying
//!
//! At any time the histogram can be queried for statistical measurements.
//! Readers never block recorders; they see a weakly-consistent snapshot
//! (see [`Histogram::value_at_percentile`] for the exact contract).
//!
//! ```
//! use hdrhist::Histogram;
//!
//! let hist = Histogram::new(3_600_000_000, 3).unwrap();
//! hist.record(100).unwrap();
//! hist.record(10_000).unwrap();
//!
//! assert_eq!(hist.min(), 100);
//! assert!(hist.equivalent(hist.value_at_percentile(99.9), 10_000));
//! ```
//!
//! Several iterators give an overview of the full distribution; the simplest
//! is [`Histogram::iter_recorded`], which yields one step per non-empty bin.
//! `iter_linear`, `iter_log` and `iter_percentiles` re-aggregate the bins
//! into fixed-width, exponential, or percentile-tick reporting levels, which
//! is what percentile-distribution output formats are built from.
//!
//! # Coordinated omission
//!
//! When a load generator records latencies synchronously, a single stall
//! swallows exactly the samples that would have shown the stall. If the
//! expected interval between samples is known, [`Histogram::record_correct`]
//! backfills the missing samples at recording time;
//! [`Histogram::add_correct`] applies the same correction while merging.

use std::cmp;
use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

use crate::core::alloc::Counts;

mod config;
pub mod core;
pub mod iterators;

pub use crate::config::BucketConfig;
pub use crate::core::alloc::{aligned_calloc, aligned_free, CountsAllocator, COUNTS_ALIGNMENT};
pub use crate::core::errors::{CreationError, RecordError};

use crate::iterators::HistogramIterator;

/// A fixed-geometry histogram of 64-bit integer values with atomic counters.
///
/// The value range is partitioned into consecutive power-of-two sized
/// buckets, each split into `sub_bucket_count` uniform sub-buckets; only the
/// upper half of every bucket after the first is stored, since the lower
/// half is already covered at finer resolution by the preceding buckets.
/// This keeps lookup a pair of shifts while guaranteeing the configured
/// number of significant figures everywhere in the range.
///
/// Geometry is immutable after construction. The counter cells, the total
/// count, and the running min/max are atomics: recording takes `&self` and
/// is safe from any number of threads. Everything else that mutates state
/// (`reset`, the serializer hooks) takes `&mut self` and therefore cannot
/// race with recorders.
#[derive(Debug)]
pub struct Histogram {
    lowest_trackable_value: i64,
    highest_trackable_value: i64,
    significant_figures: u8,

    bucket_count: u32,
    sub_bucket_count: u32,
    sub_bucket_half_count: u32,
    sub_bucket_half_count_magnitude: u32,
    sub_bucket_mask: i64,

    unit_magnitude: u32,
    leading_zero_count_base: u32,

    normalizing_index_offset: i32,
    conversion_ratio: f64,

    counts: Counts,

    // Each hot scalar gets its own cache line so contended recording does
    // not bounce the others (or the read-only geometry above) around.
    total_count: CachePadded<AtomicI64>,
    min_value: CachePadded<AtomicI64>,
    max_value: CachePadded<AtomicI64>,
}

// Construction

impl Histogram {
    /// Construct a histogram covering `[1, highest_trackable_value]` with
    /// `significant_figures` decimal digits of precision.
    ///
    /// Shorthand for [`Histogram::new_with_bounds`] with a lowest trackable
    /// value of 1.
    pub fn new(
        highest_trackable_value: i64,
        significant_figures: u8,
    ) -> Result<Histogram, CreationError> {
        Self::new_with_bounds(1, highest_trackable_value, significant_figures)
    }

    /// Construct a histogram given the lowest and highest values to be
    /// tracked and a number of significant decimal digits.
    ///
    /// Providing a `lowest_trackable_value` greater than 1 is useful when
    /// the histogram's units are much finer than the required accuracy,
    /// e.g. tracking nanosecond values where only microsecond accuracy is
    /// needed: a lowest trackable value of 1000 shrinks the counts array
    /// accordingly. `lowest_trackable_value` must be >= 1 (it is rounded
    /// down to the nearest power of two internally),
    /// `highest_trackable_value` must be >= 2 * `lowest_trackable_value`,
    /// and `significant_figures` must be between 1 and 5.
    pub fn new_with_bounds(
        lowest_trackable_value: i64,
        highest_trackable_value: i64,
        significant_figures: u8,
    ) -> Result<Histogram, CreationError> {
        Self::new_with_allocator(
            lowest_trackable_value,
            highest_trackable_value,
            significant_figures,
            CountsAllocator::default(),
        )
    }

    /// Like [`Histogram::new_with_bounds`], but the counts array is obtained
    /// from (and will be released through) the supplied allocation hooks.
    pub fn new_with_allocator(
        lowest_trackable_value: i64,
        highest_trackable_value: i64,
        significant_figures: u8,
        allocator: CountsAllocator,
    ) -> Result<Histogram, CreationError> {
        let cfg = BucketConfig::new(
            lowest_trackable_value,
            highest_trackable_value,
            significant_figures,
        )?;
        Self::from_config_with_allocator(&cfg, allocator)
    }

    /// Construct a histogram from a pre-computed [`BucketConfig`].
    pub fn from_config(cfg: &BucketConfig) -> Result<Histogram, CreationError> {
        Self::from_config_with_allocator(cfg, CountsAllocator::default())
    }

    /// Construct a histogram from a pre-computed [`BucketConfig`], using the
    /// supplied allocation hooks for the counts array.
    pub fn from_config_with_allocator(
        cfg: &BucketConfig,
        allocator: CountsAllocator,
    ) -> Result<Histogram, CreationError> {
        let counts = Counts::allocate(cfg.counts_len, allocator)?;

        Ok(Histogram {
            lowest_trackable_value: cfg.lowest_trackable_value,
            highest_trackable_value: cfg.highest_trackable_value,
            significant_figures: cfg.significant_figures,

            bucket_count: cfg.bucket_count,
            sub_bucket_count: cfg.sub_bucket_count,
            sub_bucket_half_count: cfg.sub_bucket_half_count,
            sub_bucket_half_count_magnitude: cfg.sub_bucket_half_count_magnitude,
            sub_bucket_mask: cfg.sub_bucket_mask,

            unit_magnitude: cfg.unit_magnitude,
            // subtract the bits used by the largest value in bucket 0; this
            // is the constant in the bucket_for() fast path
            leading_zero_count_base: 64
                - cfg.unit_magnitude
                - cfg.sub_bucket_half_count_magnitude
                - 1,

            normalizing_index_offset: 0,
            conversion_ratio: 1.0,

            counts,

            total_count: CachePadded::new(AtomicI64::new(0)),
            min_value: CachePadded::new(AtomicI64::new(i64::MAX)),
            max_value: CachePadded::new(AtomicI64::new(0)),
        })
    }
}

// accessors

impl Histogram {
    /// Get the number of counter cells.
    pub fn counts_len(&self) -> usize {
        self.counts.len()
    }

    /// Index of the last counter cell.
    pub fn last_index(&self) -> usize {
        self.counts_len() - 1
    }

    /// Get the configured lowest trackable value.
    pub fn lowest_trackable(&self) -> i64 {
        self.lowest_trackable_value
    }

    /// Get the configured highest trackable value.
    ///
    /// This is a coverage guarantee, not an exact cap: values past it that
    /// still fall inside the top bucket's span are accepted.
    pub fn highest_trackable(&self) -> i64 {
        self.highest_trackable_value
    }

    /// Get the configured number of significant decimal digits.
    pub fn significant_figures(&self) -> u8 {
        self.significant_figures
    }

    /// Get the number of power-of-two buckets backing the value range.
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Total number of samples recorded so far.
    pub fn total(&self) -> i64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Memory used by this histogram, including the counts array, in bytes.
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Histogram>() + self.counts.size_in_bytes()
    }

    /// The ring shift currently applied to counts-array accesses.
    pub fn normalizing_index_offset(&self) -> i32 {
        self.normalizing_index_offset
    }

    /// Set the ring shift applied to counts-array accesses. Used by external
    /// recorders that rotate histogram contents in place; the offset is
    /// reduced modulo the counts length.
    pub fn set_normalizing_index_offset(&mut self, offset: i32) {
        self.normalizing_index_offset = offset.rem_euclid(self.counts_len() as i32);
    }

    /// The scale factor external consumers apply to values on output.
    /// Stored only; none of the core queries apply it.
    pub fn conversion_ratio(&self) -> f64 {
        self.conversion_ratio
    }

    /// Set the output scale factor. See [`Histogram::conversion_ratio`].
    pub fn set_conversion_ratio(&mut self, ratio: f64) {
        self.conversion_ratio = ratio;
    }
}

// administrative (reset, serializer hooks)

impl Histogram {
    /// Reset the contents of this histogram: zero every counter, zero the
    /// total, and return min/max to their empty sentinels. The geometry is
    /// preserved.
    ///
    /// Takes `&mut self`: resetting concurrently with recorders would leave
    /// the aggregates and the cells mutually inconsistent.
    pub fn reset(&mut self) {
        for cell in self.counts.as_slice() {
            cell.store(0, Ordering::Relaxed);
        }
        self.total_count.store(0, Ordering::Relaxed);
        self.min_value.store(i64::MAX, Ordering::Relaxed);
        self.max_value.store(0, Ordering::Relaxed);
    }

    /// Overwrite the raw (un-shifted) counter cell at `index`.
    ///
    /// This writes the physical cell, ignoring any normalizing offset, and
    /// deliberately does not touch the total or min/max: it exists for
    /// deserializers that populate the counts array wholesale and then call
    /// [`Histogram::reset_internal_counters`] once.
    pub fn set_count_at_index(&mut self, index: usize, count: i64) -> Result<(), ()> {
        let cell = self.counts.as_slice().get(index).ok_or(())?;
        cell.store(count, Ordering::Relaxed);
        Ok(())
    }

    /// Rebuild the total count and the min/max trackers from a raw scan of
    /// the counts array. Call after writing cells directly with
    /// [`Histogram::set_count_at_index`].
    pub fn reset_internal_counters(&mut self) {
        let mut total = 0_i64;
        let mut min_non_zero_index = None;
        let mut max_index = None;

        for (index, cell) in self.counts.as_slice().iter().enumerate() {
            let count = cell.load(Ordering::Relaxed);
            if count > 0 {
                total += count;
                max_index = Some(index);
                if min_non_zero_index.is_none() && index != 0 {
                    min_non_zero_index = Some(index);
                }
            }
        }

        let max_value =
            max_index.map_or(0, |i| self.highest_equivalent(self.value_from_index(i)));
        let min_value = min_non_zero_index.map_or(i64::MAX, |i| self.value_from_index(i));

        self.max_value.store(max_value, Ordering::Relaxed);
        self.min_value.store(min_value, Ordering::Relaxed);
        self.total_count.store(total, Ordering::Relaxed);
    }
}

// recording

impl Histogram {
    /// Record a single occurrence of `value`.
    ///
    /// The value is counted at the precision configured at construction:
    /// it lands in the cell covering its equivalence range, i.e. it is
    /// effectively rounded down to [`Histogram::lowest_equivalent`]`(value)`.
    /// Values below the lowest trackable value (including 0) are accepted
    /// and land in the first cell. Fails iff `value` is negative or beyond
    /// the counts array, in which case no state changes.
    pub fn record(&self, value: i64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of `value` in one step.
    pub fn record_n(&self, value: i64, count: i64) -> Result<(), RecordError> {
        if value < 0 {
            return Err(RecordError::ValueOutOfRange);
        }
        let index = self.counts_index_for(value);
        if index >= self.counts_len() {
            return Err(RecordError::ValueOutOfRange);
        }
        let index = self.normalize_index(index);

        // Per-cell counts and the total only need relaxed ordering: readers
        // snapshot the total and tolerate cell/total skew.
        self.counts.as_slice()[index].fetch_add(count, Ordering::Relaxed);
        self.total_count.fetch_add(count, Ordering::Relaxed);
        self.update_min(value);
        self.update_max(value);
        Ok(())
    }

    /// Record `value`, compensating for coordinated omission.
    ///
    /// If `value` exceeds `expected_interval` (the interval at which the
    /// caller would have sampled had it not been blocked), an additional
    /// series of synthetic samples is recorded at `value -
    /// expected_interval`, `value - 2 * expected_interval`, … down to the
    /// interval itself. These are the samples a stalled synchronous client
    /// failed to take.
    ///
    /// This is an at-recording-time correction; do not also apply
    /// [`Histogram::add_correct`] to the same data set.
    pub fn record_correct(&self, value: i64, expected_interval: i64) -> Result<(), RecordError> {
        self.record_n_correct(value, 1, expected_interval)
    }

    /// Record `count` occurrences of `value`, applying the same coordinated
    /// omission correction as [`Histogram::record_correct`].
    pub fn record_n_correct(
        &self,
        value: i64,
        count: i64,
        expected_interval: i64,
    ) -> Result<(), RecordError> {
        self.record_n(value, count)?;
        if expected_interval <= 0 {
            return Ok(());
        }

        let mut missing_value = value - expected_interval;
        while missing_value >= expected_interval {
            self.record_n(missing_value, count)?;
            missing_value -= expected_interval;
        }
        Ok(())
    }

    /// Lower `min_value` to `value` if it is smaller. Value 0 is excluded:
    /// the minimum tracks non-zero samples only.
    fn update_min(&self, value: i64) {
        if value == 0 {
            return;
        }
        let mut current = self.min_value.load(Ordering::Acquire);
        while value < current {
            match self.min_value.compare_exchange_weak(
                current,
                value,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Raise `max_value` to `value` if it is larger.
    fn update_max(&self, value: i64) {
        let mut current = self.max_value.load(Ordering::Acquire);
        while value > current {
            match self.max_value.compare_exchange_weak(
                current,
                value,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

// merge

impl Histogram {
    /// Add all samples from `source` into this histogram, returning the
    /// number of samples that were dropped because they fall outside this
    /// histogram's trackable range.
    ///
    /// The destination side is ordinary atomic recording; the source is
    /// scanned cell by cell without synchronization, so merging from a
    /// source that is concurrently recorded into does not capture a
    /// point-in-time snapshot. Quiesce the source first if that matters.
    pub fn add(&self, source: &Histogram) -> i64 {
        let mut dropped = 0;
        for index in 0..source.counts_len() {
            let count = source.count_at_index(index).unwrap_or(0);
            if count != 0 {
                let value = source.value_from_index(index);
                if self.record_n(value, count).is_err() {
                    dropped += count;
                }
            }
        }
        dropped
    }

    /// Like [`Histogram::add`], but each source cell is recorded through the
    /// coordinated omission correction of [`Histogram::record_n_correct`]
    /// with the given `expected_interval`.
    pub fn add_correct(&self, source: &Histogram, expected_interval: i64) -> i64 {
        let mut dropped = 0;
        for index in 0..source.counts_len() {
            let count = source.count_at_index(index).unwrap_or(0);
            if count != 0 {
                let value = source.value_from_index(index);
                if self
                    .record_n_correct(value, count, expected_interval)
                    .is_err()
                {
                    dropped += count;
                }
            }
        }
        dropped
    }
}

// minor data statistics

impl Histogram {
    /// Get the lowest value that is equivalent to the given value within the
    /// histogram's resolution. Where "equivalent" means that value samples
    /// recorded for any two equivalent values are counted in a common
    /// counter cell.
    pub fn lowest_equivalent(&self, value: i64) -> i64 {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        self.value_from_location(bucket_index, sub_bucket_index)
    }

    /// Get the highest value that is equivalent to the given value within
    /// the histogram's resolution.
    pub fn highest_equivalent(&self, value: i64) -> i64 {
        self.next_non_equivalent(value) - 1
    }

    /// Get a value that lies in the middle (rounded up) of the range of
    /// values equivalent to the given value.
    pub fn median_equivalent(&self, value: i64) -> i64 {
        match self
            .lowest_equivalent(value)
            .overflowing_add(self.equivalent_range_len(value) >> 1)
        {
            (_, true) => i64::MAX,
            (v, false) => v,
        }
    }

    /// Get the next value that is not equivalent to the given value within
    /// the histogram's resolution.
    pub fn next_non_equivalent(&self, value: i64) -> i64 {
        match self
            .lowest_equivalent(value)
            .overflowing_add(self.equivalent_range_len(value))
        {
            (_, true) => i64::MAX,
            (v, false) => v,
        }
    }

    /// Get the size (in value units) of the range of values that are
    /// equivalent to the given value within the histogram's resolution.
    pub fn equivalent_range_len(&self, value: i64) -> i64 {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        // a sub-bucket index that lands past the bucket belongs to the next
        // (doubled) scale
        let adjusted_bucket = if sub_bucket_index >= self.sub_bucket_count as usize {
            bucket_index + 1
        } else {
            bucket_index
        };
        1_i64 << (self.unit_magnitude + adjusted_bucket)
    }

    /// Determine if two values are equivalent within the histogram's
    /// resolution, i.e. counted in a common counter cell.
    pub fn equivalent(&self, value1: i64, value2: i64) -> bool {
        self.lowest_equivalent(value1) == self.lowest_equivalent(value2)
    }

    /// Get the lowest recorded value, or 0 if no values have been recorded.
    /// Also 0 whenever the first cell is populated (a recorded value was
    /// smaller than the lowest trackable value).
    pub fn min(&self) -> i64 {
        if self.total() == 0 || self.count_at_index(0).unwrap_or(0) > 0 {
            0
        } else {
            self.min_nz()
        }
    }

    /// Get the lowest recorded non-zero value, or `i64::MAX` if no non-zero
    /// values have been recorded. This exposes the internal sentinel
    /// directly; [`Histogram::min`] is the 0-returning convention.
    pub fn min_nz(&self) -> i64 {
        let min = self.min_value.load(Ordering::Acquire);
        if min == i64::MAX {
            i64::MAX
        } else {
            self.lowest_equivalent(min)
        }
    }

    /// Get the highest recorded value, or 0 if no values have been recorded.
    pub fn max(&self) -> i64 {
        let max = self.max_value.load(Ordering::Acquire);
        if max == 0 {
            0
        } else {
            self.highest_equivalent(max)
        }
    }
}

// major data statistics

impl Histogram {
    /// Get the value at the given percentile.
    ///
    /// The percentile is clamped to `[0, 100]`. The value returned is the
    /// highest value for which the given percentage of the recorded entries
    /// are smaller than or equivalent to it; an empty histogram returns 0.
    ///
    /// The total count is snapshotted on entry. A query racing with
    /// recorders may attribute a sample to the total before its cell (or
    /// vice versa); results stay within the configured precision but are
    /// not linearizable.
    pub fn value_at_percentile(&self, percentile: f64) -> i64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }

        let requested = percentile.clamp(0.0, 100.0);
        let count_at_percentile = cmp::max(((requested / 100.0) * total as f64).ceil() as i64, 1);

        let mut total_to_current_index = 0_i64;
        for index in 0..self.counts_len() {
            total_to_current_index += self.count_at_index(index).unwrap_or(0);
            if total_to_current_index >= count_at_percentile {
                let value_at_index = self.value_from_index(index);
                return self.highest_equivalent(value_at_index);
            }
        }

        0
    }

    /// Get the computed mean of all recorded values, or 0.0 when empty.
    ///
    /// Each cell contributes its median equivalent value, so the result is
    /// accurate to within the configured precision.
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        self.iter_recorded().fold(0.0_f64, |sum, iv| {
            sum + self.median_equivalent(iv.value_iterated_to()) as f64
                * iv.count_at_value() as f64
                / total as f64
        })
    }

    /// Get the computed standard deviation of all recorded values, or 0.0
    /// when empty.
    pub fn stdev(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        let mean = self.mean();
        let geom_dev_tot = self.iter_recorded().fold(0.0_f64, |gdt, iv| {
            let dev = self.median_equivalent(iv.value_iterated_to()) as f64 - mean;
            gdt + (dev * dev) * iv.count_at_value() as f64
        });

        (geom_dev_tot / total as f64).sqrt()
    }

    /// Get the count of recorded values within the equivalence range of
    /// `value`. Out-of-range values are clamped to the first or last cell.
    pub fn count_at(&self, value: i64) -> i64 {
        let index = if value < 0 {
            0
        } else {
            cmp::min(self.counts_index_for(value), self.last_index())
        };
        self.count_at_index(index).unwrap_or(0)
    }

    /// Get the count in the cell at `index`, or `None` if the index is out
    /// of bounds. The normalizing offset, if any, is applied.
    pub fn count_at_index(&self, index: usize) -> Option<i64> {
        if index >= self.counts_len() {
            return None;
        }
        let index = self.normalize_index(index);
        Some(self.counts.as_slice()[index].load(Ordering::Relaxed))
    }
}

// iterators

impl Histogram {
    /// Iterate through histogram values at percentile reporting levels. The
    /// steps start at 0% and reduce their distance to 100% according to
    /// `ticks_per_half_distance`, ultimately reaching 100% when all recorded
    /// values are exhausted.
    pub fn iter_percentiles(
        &self,
        ticks_per_half_distance: u32,
    ) -> HistogramIterator<'_, iterators::percentile::Iter<'_>> {
        iterators::percentile::Iter::new(self, ticks_per_half_distance)
    }

    /// Iterate through histogram values in steps of `value_units_per_bucket`
    /// in size, terminating when all recorded values are exhausted.
    pub fn iter_linear(
        &self,
        value_units_per_bucket: i64,
    ) -> HistogramIterator<'_, iterators::linear::Iter<'_>> {
        iterators::linear::Iter::new(self, value_units_per_bucket)
    }

    /// Iterate through histogram values at logarithmically increasing
    /// levels, starting at `value_units_in_first_bucket` and growing by
    /// `log_base` per step.
    pub fn iter_log(
        &self,
        value_units_in_first_bucket: i64,
        log_base: f64,
    ) -> HistogramIterator<'_, iterators::log::Iter<'_>> {
        iterators::log::Iter::new(self, value_units_in_first_bucket, log_base)
    }

    /// Iterate through all non-empty cells at the finest granularity the
    /// representation supports.
    pub fn iter_recorded(&self) -> HistogramIterator<'_, iterators::recorded::Iter> {
        iterators::recorded::Iter::new(self)
    }

    /// Iterate through every cell, empty or not, up through the last
    /// recorded value.
    pub fn iter_all(&self) -> HistogramIterator<'_, iterators::all::Iter> {
        iterators::all::Iter::new(self)
    }
}

// helpers

impl Histogram {
    /// The lowest (and therefore highest precision) bucket index that can
    /// represent the value.
    fn bucket_for(&self, value: i64) -> u32 {
        // Number of powers of two by which the value exceeds the biggest
        // value that fits in bucket 0. The mask maps values below the
        // sub-bucket range to bucket 0.
        debug_assert!(value >= 0);
        self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros()
    }

    /// Sub-bucket slot of `value` within `bucket_index`. For bucket 0 this
    /// may be anywhere in `0..sub_bucket_count`; for every later bucket it
    /// lands in the top half, because a bottom-half slot would have been
    /// representable (at twice the precision) in the previous bucket.
    fn sub_bucket_for(&self, value: i64, bucket_index: u32) -> usize {
        (value >> (bucket_index + self.unit_magnitude)) as usize
    }

    #[inline]
    fn value_from_location(&self, bucket_index: u32, sub_bucket_index: usize) -> i64 {
        (sub_bucket_index as i64) << (bucket_index + self.unit_magnitude)
    }

    /// Position of the cell counting `value`, before any normalizing shift.
    fn counts_index_for(&self, value: i64) -> usize {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);

        debug_assert!(sub_bucket_index < self.sub_bucket_count as usize);
        debug_assert!(
            bucket_index == 0 || sub_bucket_index >= self.sub_bucket_half_count as usize
        );

        // The first slot a bucket actually uses is halfway through its
        // sub-bucket range; bucket 0 is the exception and owns the full
        // range, which is why the base index starts one bucket up.
        let bucket_base_index =
            (bucket_index as usize + 1) << self.sub_bucket_half_count_magnitude;
        bucket_base_index + sub_bucket_index - self.sub_bucket_half_count as usize
    }

    /// Apply the normalizing ring shift to a logical index.
    fn normalize_index(&self, index: usize) -> usize {
        if self.normalizing_index_offset == 0 {
            return index;
        }
        let len = self.counts_len() as i32;
        let mut normalized = index as i32 - self.normalizing_index_offset;
        if normalized < 0 {
            normalized += len;
        } else if normalized >= len {
            normalized -= len;
        }
        normalized as usize
    }

    /// The lowest value covered by the cell at the given logical index.
    pub fn value_from_index(&self, index: usize) -> i64 {
        let mut bucket_index = (index >> self.sub_bucket_half_count_magnitude) as isize - 1;
        let mut sub_bucket_index = (index & (self.sub_bucket_half_count as usize - 1))
            + self.sub_bucket_half_count as usize;
        if bucket_index < 0 {
            // lower half of bucket 0
            sub_bucket_index -= self.sub_bucket_half_count as usize;
            bucket_index = 0;
        }
        self.value_from_location(bucket_index as u32, sub_bucket_index)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
