//! Seat layout - the fixed classroom coordinate table

use serde::{Deserialize, Serialize};

/// Rows of the classroom and the grid columns occupied by seats in each.
/// Gaps in the column numbers are aisles.
const CLASSROOM_ROWS: [(u8, &[u8]); 3] = [
    (1, &[1, 2, 4, 5, 7, 8]),
    (2, &[1, 2, 4, 5, 7, 8]),
    (3, &[1, 2, 4, 5]),
];

/// A single seat position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatSlot {
    pub row: u8,
    pub col: u8,
}

/// Seat slots in canonical order: row ascending, then column ascending.
/// A slot's position in this list is its seat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLayout {
    slots: Vec<SeatSlot>,
}

impl SeatLayout {
    /// The 16-seat classroom table
    pub fn classroom() -> Self {
        let slots = CLASSROOM_ROWS
            .iter()
            .flat_map(|(row, cols)| cols.iter().map(move |&col| SeatSlot { row: *row, col }))
            .collect();
        Self::from_slots(slots)
    }

    /// Build a layout from arbitrary slots, sorting them into canonical order
    pub fn from_slots(mut slots: Vec<SeatSlot>) -> Self {
        slots.sort();
        slots.dedup();
        Self { slots }
    }

    pub fn slots(&self) -> &[SeatSlot] {
        &self.slots
    }

    pub fn seat_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<SeatSlot> {
        self.slots.get(index).copied()
    }

    /// Highest row and column in use, for renderers sizing a grid
    pub fn extent(&self) -> (u8, u8) {
        let rows = self.slots.iter().map(|s| s.row).max().unwrap_or(0);
        let cols = self.slots.iter().map(|s| s.col).max().unwrap_or(0);
        (rows, cols)
    }
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self::classroom()
    }
}
