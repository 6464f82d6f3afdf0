//! Pooled point table: batched emission from drivers to the consumer.
//!
//! Drivers push points one at a time; the table buffers them up to a fixed
//! capacity and hands full batches to a process callback. An optional
//! reprojection stage set by the executor runs over each batch before it
//! reaches the callback.

use crate::reprojection::ReprojectionFilter;
use canopy_core::Point;

/// Default pool capacity in points.
pub const DEFAULT_TABLE_CAPACITY: usize = 65_536;

/// Batch consumer invoked on each flush.
pub type ProcessFn = Box<dyn FnMut(&[Point]) + Send>;

/// Capacity-bounded point buffer with a flush callback.
pub struct PooledPointTable {
    capacity: usize,
    buffer: Vec<Point>,
    process: ProcessFn,
    filter: Option<Box<dyn ReprojectionFilter>>,
    num_points: u64,
}

impl PooledPointTable {
    pub fn new(process: impl FnMut(&[Point]) + Send + 'static) -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY, process)
    }

    pub fn with_capacity(
        capacity: usize,
        process: impl FnMut(&[Point]) + Send + 'static,
    ) -> Self {
        debug_assert!(capacity > 0, "table capacity must be positive");
        Self {
            capacity,
            buffer: Vec::with_capacity(capacity),
            process: Box::new(process),
            filter: None,
            num_points: 0,
        }
    }

    /// Append one point, flushing when the pool fills.
    pub fn push(&mut self, point: Point) {
        self.buffer.push(point);
        self.num_points += 1;
        if self.buffer.len() >= self.capacity {
            self.flush();
        }
    }

    /// Hand the buffered batch to the consumer, running the reprojection
    /// stage first when one is set.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        if let Some(filter) = &self.filter {
            filter.filter(&mut self.buffer);
        }

        (self.process)(&self.buffer);
        self.buffer.clear();
    }

    /// Total points pushed over the table's lifetime.
    #[inline]
    pub fn num_points(&self) -> u64 {
        self.num_points
    }

    pub(crate) fn set_filter(&mut self, filter: Box<dyn ReprojectionFilter>) {
        self.filter = Some(filter);
    }

    pub(crate) fn clear_filter(&mut self) {
        self.filter = None;
    }
}

impl std::fmt::Debug for PooledPointTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledPointTable")
            .field("capacity", &self.capacity)
            .field("buffered", &self.buffer.len())
            .field("num_points", &self.num_points)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_flushes_at_capacity() {
        let batches: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&batches);

        let mut table =
            PooledPointTable::with_capacity(4, move |pts| sink.lock().unwrap().push(pts.len()));

        for i in 0..10 {
            table.push(Point::new(i as f64, 0.0, 0.0));
        }
        table.flush();

        assert_eq!(*batches.lock().unwrap(), vec![4, 4, 2]);
        assert_eq!(table.num_points(), 10);
    }

    #[test]
    fn test_empty_flush_is_silent() {
        let batches: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&batches);

        let mut table =
            PooledPointTable::with_capacity(4, move |pts| sink.lock().unwrap().push(pts.len()));
        table.flush();

        assert!(batches.lock().unwrap().is_empty());
    }
}
