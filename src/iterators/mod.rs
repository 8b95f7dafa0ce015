//! Iteration over the histogram's cells at various granularities.

use crate::Histogram;

/// An iterator that yields at percentile reporting levels.
pub mod percentile;

/// An iterator that yields at fixed-width value steps.
pub mod linear;

/// An iterator that yields at exponentially growing value steps.
pub mod log;

/// An iterator that yields every non-empty cell.
pub mod recorded;

/// An iterator that yields every cell.
pub mod all;

/// The value yielded at one iteration step.
#[derive(Debug, PartialEq, Clone)]
pub struct IterationValue {
    value_iterated_to: i64,
    value_iterated_from: i64,
    percentile: f64,
    percentile_iterated_to: f64,
    count_at_value: i64,
    count_since_last_iteration: i64,
}

impl IterationValue {
    pub(crate) fn new(
        value_iterated_to: i64,
        value_iterated_from: i64,
        percentile: f64,
        percentile_iterated_to: f64,
        count_at_value: i64,
        count_since_last_iteration: i64,
    ) -> IterationValue {
        IterationValue {
            value_iterated_to,
            value_iterated_from,
            percentile,
            percentile_iterated_to,
            count_at_value,
            count_since_last_iteration,
        }
    }

    /// The reporting level this step ran up to: the highest equivalent value
    /// of the current cell, unless the discipline substitutes its own level
    /// (linear and log steps report their step boundary).
    pub fn value_iterated_to(&self) -> i64 {
        self.value_iterated_to
    }

    /// The reporting level of the previous step (0 for the first step).
    pub fn value_iterated_from(&self) -> i64 {
        self.value_iterated_from
    }

    /// Percentile of recorded values at or below this step.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// The percentile level the iteration was moving toward when it yielded
    /// this step. Differs from [`IterationValue::percentile`] only for the
    /// percentile discipline, whose ticks are positions between cells.
    pub fn percentile_iterated_to(&self) -> f64 {
        self.percentile_iterated_to
    }

    /// The count in the current cell.
    pub fn count_at_value(&self) -> i64 {
        self.count_at_value
    }

    /// The number of samples this step added relative to the previous step.
    pub fn count_since_last_iteration(&self) -> i64 {
        self.count_since_last_iteration
    }
}

/// Overrides a discipline can attach to a picked step.
pub struct PickMetadata {
    /// Percentile tick the discipline was iterating toward, if it differs
    /// from the cumulative percentile of the current cell.
    percentile_iterated_to: Option<f64>,
    /// Reporting value for the step, if it differs from the highest
    /// equivalent value of the current cell.
    value_iterated_to: Option<i64>,
}

impl PickMetadata {
    pub(crate) fn new(
        percentile_iterated_to: Option<f64>,
        value_iterated_to: Option<i64>,
    ) -> PickMetadata {
        PickMetadata {
            percentile_iterated_to,
            value_iterated_to,
        }
    }
}

/// A trait for designing a subset iterator over cells in a `Histogram`.
pub trait PickyIterator {
    /// Should a step be yielded at the given index? `running_total` is the
    /// sum of all counts up to and including this index against the
    /// iterator's total-count snapshot.
    fn pick(
        &mut self,
        index: usize,
        running_total: i64,
        count_at_index: i64,
    ) -> Option<PickMetadata>;

    /// Should iteration continue even though every recorded count has been
    /// consumed? Called with the index the next pick would see. Disciplines
    /// with fixed reporting levels use this to emit trailing empty steps.
    fn more(&mut self, index_to_pick: usize) -> bool;
}

/// `HistogramIterator` provides a base iterator for a `Histogram`.
///
/// It iterates over cells until the recorded values are exhausted (*not*
/// necessarily until all cells have been visited), delegating to a *picker*
/// which selects the cells that become steps and may extend the iteration
/// past the last recorded value.
///
/// One peculiarity: when the picker yields a step, the same cell is
/// re-visited before moving on. Disciplines whose reporting levels are
/// narrower than a cell rely on this to emit several steps inside one cell;
/// the single-step disciplines track the last index they picked.
///
/// The total count is snapshotted when the iterator is created and serves
/// as the termination bound; recording that happens concurrently with the
/// iteration is not reflected in the steps.
pub struct HistogramIterator<'a, P: PickyIterator> {
    hist: &'a Histogram,
    total_count: i64,
    total_count_to_index: i64,
    prev_total_count: i64,
    current_index: usize,
    value_iterated_from: i64,
    fresh: bool,
    ended: bool,
    picker: P,
}

impl<'a, P: PickyIterator> HistogramIterator<'a, P> {
    pub(crate) fn new(hist: &'a Histogram, picker: P) -> HistogramIterator<'a, P> {
        HistogramIterator {
            hist,
            total_count: hist.total(),
            total_count_to_index: 0,
            prev_total_count: 0,
            current_index: 0,
            value_iterated_from: 0,
            fresh: true,
            ended: false,
            picker,
        }
    }

    fn current(&self, metadata: PickMetadata) -> IterationValue {
        let value = self
            .hist
            .highest_equivalent(self.hist.value_from_index(self.current_index));
        let percentile = 100.0 * self.total_count_to_index as f64 / self.total_count as f64;
        let count_at_value = self.hist.count_at_index(self.current_index).unwrap_or(0);

        IterationValue::new(
            metadata.value_iterated_to.unwrap_or(value),
            self.value_iterated_from,
            percentile,
            metadata.percentile_iterated_to.unwrap_or(percentile),
            count_at_value,
            self.total_count_to_index - self.prev_total_count,
        )
    }
}

impl<'a, P: PickyIterator> Iterator for HistogramIterator<'a, P> {
    type Item = IterationValue;

    fn next(&mut self) -> Option<IterationValue> {
        if self.total_count == 0 {
            self.ended = true;
        }

        while !self.ended {
            // run out of cells?
            if self.current_index == self.hist.counts_len() {
                self.ended = true;
                return None;
            }

            let count_at_index = self.hist.count_at_index(self.current_index).unwrap_or(0);

            if self.prev_total_count >= self.total_count {
                // every recorded count has been consumed; the picker decides
                // whether to keep emitting trailing steps
                if !self.picker.more(self.current_index) {
                    self.ended = true;
                    return None;
                }
            } else if self.fresh {
                // add this cell to the running total exactly once, no matter
                // how many steps the picker emits while sitting on it
                self.total_count_to_index += count_at_index;
                self.fresh = false;
            }

            if let Some(metadata) =
                self.picker
                    .pick(self.current_index, self.total_count_to_index, count_at_index)
            {
                let val = self.current(metadata);
                self.prev_total_count = self.total_count_to_index;
                self.value_iterated_from = val.value_iterated_to;
                return Some(val);
            }

            // check the next cell
            self.current_index += 1;
            self.fresh = true;
        }
        None
    }
}
