//! Seat grid interface
//!
//! The orchestrator never renders anything itself. It emits
//! [`GridCommand`]s against a [`SeatGrid`], which owns the actual display
//! (terminal, GUI, or a recorder in tests).

use crate::models::{SeatLayout, Student};

/// Per-seat visual flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatFlag {
    /// Seat is highlighted as revealed
    Spotlit,
    /// Short-lived ring effect on a newly revealed seat
    Ripple,
    /// Name label has finished its entrance
    NameShown,
}

/// Whole-grid visual flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridFlag {
    /// Stage overlay dimmed and grid blurred
    Dimmed,
    /// Bright overlay flash at the finale
    Flash,
    /// Whole-grid nudge at the finale
    Shift,
    /// Seats animate opacity changes with an eased transition
    EasedTransitions,
}

/// Commands the orchestrator issues to the grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridCommand {
    /// Write a seat's occupant; `None` clears the seat
    SetOccupant {
        seat: usize,
        student: Option<Student>,
    },
    SetOpacity {
        seat: usize,
        opacity: f32,
    },
    SetSeatFlag {
        seat: usize,
        flag: SeatFlag,
        on: bool,
    },
    SetGridFlag {
        flag: GridFlag,
        on: bool,
    },
    /// Brief scale micro-animation on one seat
    Pulse {
        seat: usize,
        duration_ms: u64,
    },
    /// Show a countdown tick; `None` hides the indicator
    Countdown(Option<u32>),
}

/// Display surface for the seat grid
pub trait SeatGrid: Send + Sync {
    /// Seat slots in canonical order
    fn layout(&self) -> &SeatLayout;

    /// Apply one visual change
    fn apply(&self, command: GridCommand);

    fn seat_count(&self) -> usize {
        self.layout().seat_count()
    }
}
