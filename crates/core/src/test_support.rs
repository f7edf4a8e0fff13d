//! Fakes shared by unit tests: a recording grid, a recording timer that
//! never sleeps, and an in-memory audio track.

use std::sync::Mutex;
use std::time::Duration;

use crate::audio::{AudioTrack, PlaybackError};
use crate::grid::{GridCommand, SeatGrid};
use crate::models::{SeatLayout, SeatSlot};
use crate::timer::{Delay, StageTimer};

/// Grid that stores every command it receives
pub struct RecordingGrid {
    layout: SeatLayout,
    commands: Mutex<Vec<GridCommand>>,
}

impl RecordingGrid {
    pub fn classroom() -> Self {
        Self::with_layout(SeatLayout::classroom())
    }

    /// Single row of `n` seats
    pub fn row(n: u8) -> Self {
        let slots = (1..=n).map(|col| SeatSlot { row: 1, col }).collect();
        Self::with_layout(SeatLayout::from_slots(slots))
    }

    pub fn with_layout(layout: SeatLayout) -> Self {
        Self {
            layout,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<GridCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Seats written with an occupant, in write order
    pub fn occupant_writes(&self) -> Vec<usize> {
        self.commands()
            .iter()
            .filter_map(|c| match c {
                GridCommand::SetOccupant {
                    seat,
                    student: Some(_),
                } => Some(*seat),
                _ => None,
            })
            .collect()
    }
}

impl SeatGrid for RecordingGrid {
    fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    fn apply(&self, command: GridCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

/// Timer that records each requested duration and completes immediately
#[derive(Default)]
pub struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn count(&self, duration: Duration) -> usize {
        self.delays().iter().filter(|d| **d == duration).count()
    }
}

impl StageTimer for RecordingTimer {
    fn delay(&self, duration: Duration) -> Delay {
        self.delays.lock().unwrap().push(duration);
        Box::pin(std::future::ready(()))
    }
}

#[derive(Debug)]
struct TrackState {
    paused: bool,
    volume: f32,
    plays: usize,
    pauses: usize,
    rewinds: usize,
}

/// In-memory track. Starts paused at full volume.
pub struct FakeTrack {
    state: Mutex<TrackState>,
    failure: Option<String>,
}

impl FakeTrack {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackState {
                paused: true,
                volume: 1.0,
                plays: 0,
                pauses: 0,
                rewinds: 0,
            }),
            failure: None,
        }
    }

    /// Track whose `play` always fails
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn plays(&self) -> usize {
        self.state.lock().unwrap().plays
    }

    pub fn pauses(&self) -> usize {
        self.state.lock().unwrap().pauses
    }

    pub fn rewinds(&self) -> usize {
        self.state.lock().unwrap().rewinds
    }
}

impl AudioTrack for FakeTrack {
    fn play(&self) -> Result<(), PlaybackError> {
        if let Some(reason) = &self.failure {
            return Err(PlaybackError::NotAllowed(reason.clone()));
        }
        let mut state = self.state.lock().unwrap();
        state.paused = false;
        state.plays += 1;
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        state.paused = true;
        state.pauses += 1;
    }

    fn rewind(&self) {
        self.state.lock().unwrap().rewinds += 1;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }
}
