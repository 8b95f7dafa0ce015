use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at fixed-size steps through the histogram's
/// value range.
pub struct Iter<'a> {
    hist: &'a Histogram,

    // > 0
    value_units_per_bucket: i64,
    current_step_highest_value_reporting_level: i64,
    current_step_lowest_value_reporting_level: i64,
}

impl<'a> Iter<'a> {
    /// Construct a new linear iterator. See `Histogram::iter_linear` for
    /// details.
    pub fn new(hist: &'a Histogram, value_units_per_bucket: i64) -> HistogramIterator<'a, Iter<'a>> {
        assert!(
            value_units_per_bucket > 0,
            "value_units_per_bucket must be > 0"
        );

        let new_lowest = hist.lowest_equivalent(value_units_per_bucket - 1);
        HistogramIterator::new(
            hist,
            Iter {
                hist,
                value_units_per_bucket,
                // won't underflow because value_units_per_bucket > 0
                current_step_highest_value_reporting_level: value_units_per_bucket - 1,
                current_step_lowest_value_reporting_level: new_lowest,
            },
        )
    }
}

impl<'a> PickyIterator for Iter<'a> {
    fn pick(&mut self, index: usize, _: i64, _: i64) -> Option<PickMetadata> {
        let val = self.hist.value_from_index(index);
        if val >= self.current_step_lowest_value_reporting_level || index == self.hist.last_index()
        {
            let metadata =
                PickMetadata::new(None, Some(self.current_step_highest_value_reporting_level));
            self.current_step_highest_value_reporting_level += self.value_units_per_bucket;
            self.current_step_lowest_value_reporting_level = self
                .hist
                .lowest_equivalent(self.current_step_highest_value_reporting_level);
            Some(metadata)
        } else {
            None
        }
    }

    fn more(&mut self, index_to_pick: usize) -> bool {
        // If the next iterate will not move to the next cell (which is empty
        // if we reached this point), we are not yet done: iteration should
        // continue until it is no longer on a value that has a count, not
        // stop at the first arrival there. The difference is subtle but
        // matters for steps narrower than the cell holding the max value.
        let next_index = index_to_pick.checked_add(1).expect("usize overflow");
        self.current_step_highest_value_reporting_level < self.hist.value_from_index(next_index)
    }
}
