use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at percentile steps through the histogram's
/// value range.
pub struct Iter<'a> {
    hist: &'a Histogram,

    ticks_per_half_distance: u32,
    percentile_to_iterate_to: f64,
    seen_last_value: bool,
}

impl<'a> Iter<'a> {
    /// Construct a new percentile iterator. See `Histogram::iter_percentiles`
    /// for details.
    pub fn new(hist: &'a Histogram, ticks_per_half_distance: u32) -> HistogramIterator<'a, Iter<'a>> {
        assert!(
            ticks_per_half_distance > 0,
            "ticks_per_half_distance must be > 0"
        );

        HistogramIterator::new(
            hist,
            Iter {
                hist,
                ticks_per_half_distance,
                percentile_to_iterate_to: 0.0,
                seen_last_value: false,
            },
        )
    }
}

impl<'a> PickyIterator for Iter<'a> {
    fn pick(&mut self, _: usize, running_total: i64, count_at_index: i64) -> Option<PickMetadata> {
        if count_at_index == 0 || self.seen_last_value {
            return None;
        }

        let current_percentile = 100.0 * running_total as f64 / self.hist.total() as f64;
        if current_percentile < self.percentile_to_iterate_to {
            return None;
        }

        let metadata = PickMetadata::new(Some(self.percentile_to_iterate_to), None);

        if self.percentile_to_iterate_to == 100.0 {
            // the final step; there is no next tick past 100%
            self.seen_last_value = true;
            return Some(metadata);
        }

        // The iteration maintains fixed-size "ticks" in each half-distance
        // to 100% (starting from 0%), as opposed to a tick size that varies
        // with each interval: the resulting percentile steps are the ones a
        // human can browse in a distribution printout. The scale changes,
        // and the tick size is effectively cut in half, every time another
        // half of the remaining distance to 100% has been crossed.
        let num_halvings = (100.0 / (100.0 - self.percentile_to_iterate_to)).log2() as u32;
        // each slice has two half-distances to tick, hence one extra doubling
        let total_ticks = u64::from(self.ticks_per_half_distance)
            .checked_shl(num_halvings + 1)
            .expect("too many percentile ticks");
        let increment = 100.0 / total_ticks as f64;

        let next = self.percentile_to_iterate_to + increment;
        self.percentile_to_iterate_to = if next == self.percentile_to_iterate_to {
            // the increment no longer moves an f64 this close to 100; short
            // circuit so the iteration still terminates
            100.0
        } else {
            next
        };
        Some(metadata)
    }

    fn more(&mut self, _: usize) -> bool {
        // one additional, final step to 100%
        if self.seen_last_value {
            return false;
        }
        self.percentile_to_iterate_to = 100.0;
        true
    }
}
