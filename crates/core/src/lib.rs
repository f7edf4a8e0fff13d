//! Seat Reveal Core Library
//!
//! Randomized seat assignment, reveal ordering, and the staged reveal
//! orchestrator that drives a seat grid and two audio cues.

pub mod audio;
pub mod config;
pub mod error;
pub mod grid;
pub mod invariants;
pub mod models;
pub mod orchestrator;
pub mod randomizer;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use audio::{AudioCoordinator, AudioTrack, PlaybackError, PlaybackOutcome, TrackId};
pub use config::{AudioConfig, ConfigError, RevealConfig, RevealSettings, TimingConfig};
pub use error::{Error, Result};
pub use grid::{GridCommand, GridFlag, SeatFlag, SeatGrid};
pub use models::*;
pub use orchestrator::{CycleReport, OrderMode, Orchestrator, Phase, RevealPath, Trigger};
pub use timer::{Delay, StageTimer, TokioTimer};
