//! Latest-value cell for the tracked display position.
//!
//! One [`PositionWriter`] (owned by the position tracker) and any number of
//! [`PositionReader`]s. Both coordinates live in a single `AtomicU64`, so a
//! reader never observes an x from one publish paired with a y from another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::shared::point::Point;

/// Creates a cell holding `initial` and returns its two ends.
pub fn position_cell(initial: Point) -> (PositionWriter, PositionReader) {
    let cell = Arc::new(AtomicU64::new(initial.to_bits()));
    (
        PositionWriter { cell: cell.clone() },
        PositionReader { cell },
    )
}

/// Sole write end. Deliberately not `Clone`.
pub struct PositionWriter {
    cell: Arc<AtomicU64>,
}

impl PositionWriter {
    pub fn publish(&self, position: Point) {
        self.cell.store(position.to_bits(), Ordering::Release);
    }

    pub fn reader(&self) -> PositionReader {
        PositionReader {
            cell: self.cell.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PositionReader {
    cell: Arc<AtomicU64>,
}

impl PositionReader {
    pub fn load(&self) -> Point {
        Point::from_bits(self.cell.load(Ordering::Acquire))
    }
}
