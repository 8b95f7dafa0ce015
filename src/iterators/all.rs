use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield every cell, in order, up through the last
/// recorded value.
pub struct Iter {
    visited: Option<usize>,
}

impl Iter {
    /// Construct a new full iterator. See `Histogram::iter_all` for details.
    pub fn new(hist: &Histogram) -> HistogramIterator<'_, Iter> {
        HistogramIterator::new(hist, Iter { visited: None })
    }
}

impl PickyIterator for Iter {
    fn pick(&mut self, index: usize, _: i64, _: i64) -> Option<PickMetadata> {
        // have we visited before?
        if self.visited.map_or(true, |v| v != index) {
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
