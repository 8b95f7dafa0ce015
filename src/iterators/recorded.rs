use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield only the cells with recorded counts.
pub struct Iter {
    visited: Option<usize>,
}

impl Iter {
    /// Construct a new recorded-values iterator. See
    /// `Histogram::iter_recorded` for details.
    pub fn new(hist: &Histogram) -> HistogramIterator<'_, Iter> {
        HistogramIterator::new(hist, Iter { visited: None })
    }
}

impl PickyIterator for Iter {
    fn pick(&mut self, index: usize, _: i64, count_at_index: i64) -> Option<PickMetadata> {
        if count_at_index != 0 && self.visited.map_or(true, |v| v != index) {
            self.visited = Some(index);
            Some(PickMetadata::new(None, None))
        } else {
            None
        }
    }

    fn more(&mut self, _: usize) -> bool {
        false
    }
}
