//! Reveal orchestrator - sequences the seat reveal stages
//!
//! A cycle runs `Idle -> Countdown -> QuickPreview* -> FinalReveal -> Settle`
//! or, for instant triggers, `Idle -> InstantReveal -> Settle`. Stages run
//! strictly in order on one timeline; the only concurrent work is detached
//! effect timers (flag clears, audio fade).
//!
//! At most one cycle runs at a time. A trigger that arrives while a cycle is
//! active is rejected with [`Error::CycleInProgress`].

mod stages;

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::audio::{AudioCoordinator, AudioTrack, PlaybackOutcome, TrackId};
use crate::config::{RevealConfig, RevealSettings, TimingConfig};
use crate::error::{Error, Result};
use crate::grid::SeatGrid;
use crate::invariants;
use crate::models::{Assignment, RevealOrder, Roster};
use crate::timer::StageTimer;

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Countdown,
    QuickPreview,
    FinalReveal,
    InstantReveal,
    Settle,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Countdown => write!(f, "countdown"),
            Phase::QuickPreview => write!(f, "quick preview"),
            Phase::FinalReveal => write!(f, "final reveal"),
            Phase::InstantReveal => write!(f, "instant reveal"),
            Phase::Settle => write!(f, "settle"),
        }
    }
}

/// How the final reveal walks the seats
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderMode {
    /// Row-major
    #[default]
    Canonical,
    /// Fresh random permutation each cycle
    Random,
    /// Caller-supplied order; malformed orders fall back to canonical
    Explicit(Vec<usize>),
}

/// Parameters of one user-triggered cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Total shuffles including the final one; values below 1 count as 1
    pub cycles: u32,
    /// Skip every timed stage and show the result at once
    pub instant: bool,
    pub order: OrderMode,
}

impl Trigger {
    pub fn staged(cycles: u32) -> Self {
        Self {
            cycles,
            instant: false,
            order: OrderMode::Canonical,
        }
    }

    pub fn instant() -> Self {
        Self {
            cycles: 1,
            instant: true,
            order: OrderMode::Canonical,
        }
    }

    pub fn with_random_order(mut self) -> Self {
        self.order = OrderMode::Random;
        self
    }

    pub fn with_order(mut self, order: Vec<usize>) -> Self {
        self.order = OrderMode::Explicit(order);
        self
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::staged(1)
    }
}

/// Which terminal branch a cycle took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPath {
    Staged,
    Instant,
}

/// What happened during one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub path: RevealPath,
    /// Stages entered, in order
    pub stages: Vec<Phase>,
    /// Preview shuffles shown before the final reveal
    pub previews: usize,
    /// The definitive assignment
    pub assignment: Assignment,
    pub reveal_order: RevealOrder,
    /// Seats written during the reveal, in write order
    pub revealed: Vec<usize>,
    /// Whether the finale (sting, flash) fired
    pub finale_fired: bool,
    /// Seat the finale fired on, if it was tied to one
    pub finale_seat: Option<usize>,
    /// Best-effort playback results, in call order
    pub playback: Vec<(TrackId, PlaybackOutcome)>,
}

impl CycleReport {
    fn new(path: RevealPath, seat_count: usize) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            started_at: Utc::now(),
            path,
            stages: Vec::new(),
            previews: 0,
            assignment: Assignment::empty(seat_count),
            reveal_order: RevealOrder::canonical(seat_count),
            revealed: Vec::new(),
            finale_fired: false,
            finale_seat: None,
            playback: Vec::new(),
        }
    }
}

/// Drives the seat grid and audio through a reveal cycle
pub struct Orchestrator {
    roster: Roster,
    grid: Arc<dyn SeatGrid>,
    audio: AudioCoordinator,
    timer: Arc<dyn StageTimer>,
    timing: TimingConfig,
    settings: RevealSettings,
    rng: Mutex<StdRng>,
    phase: Mutex<Phase>,
}

impl Orchestrator {
    pub fn new(
        roster: Roster,
        grid: Arc<dyn SeatGrid>,
        ambient: Arc<dyn AudioTrack>,
        sting: Arc<dyn AudioTrack>,
        timer: Arc<dyn StageTimer>,
        config: &RevealConfig,
    ) -> Self {
        let audio = AudioCoordinator::new(ambient, sting, timer.clone(), config.audio.clone());
        Self {
            roster,
            grid,
            audio,
            timer,
            timing: config.timing.clone(),
            settings: config.reveal.clone(),
            rng: Mutex::new(StdRng::from_entropy()),
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Replace the randomness source, e.g. with a seeded RNG
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn audio(&self) -> &AudioCoordinator {
        &self.audio
    }

    pub fn seat_count(&self) -> usize {
        self.grid.seat_count()
    }

    /// Repeat count used when the caller has no preference
    pub fn default_cycles(&self) -> u32 {
        self.settings.default_cycles
    }

    /// Run one full reveal cycle. Returns once Settle has started the audio
    /// fade; the fade itself continues in the background.
    pub async fn trigger(&self, trigger: Trigger) -> Result<CycleReport> {
        let (path, first_stage) = if trigger.instant {
            (RevealPath::Instant, Phase::InstantReveal)
        } else {
            (RevealPath::Staged, Phase::Countdown)
        };
        let _cycle = self.begin_cycle(first_stage)?;

        let seat_count = self.seat_count();
        let cycles = trigger.cycles.max(1);
        let mut report = CycleReport::new(path, seat_count);

        tracing::info!(
            cycle_id = %report.cycle_id,
            cycles,
            instant = trigger.instant,
            order = ?trigger.order,
            students = self.roster.len(),
            "Reveal cycle started"
        );

        match path {
            RevealPath::Instant => {
                let assignment = self.shuffle_assignment();
                self.instant_reveal(assignment, &mut report);
            }
            RevealPath::Staged => {
                self.countdown(&mut report).await;

                for _ in 1..cycles {
                    let preview = self.shuffle_assignment();
                    self.quick_preview(&preview, &mut report).await;
                }

                let assignment = self.shuffle_assignment();
                let order = self.reveal_order(trigger.order, seat_count);
                self.final_reveal(assignment, order, &mut report).await;
            }
        }

        self.settle(&mut report);
        invariants::assert_report_invariants(&report);

        tracing::info!(
            cycle_id = %report.cycle_id,
            revealed = report.revealed.len(),
            previews = report.previews,
            "Reveal cycle finished"
        );

        Ok(report)
    }

    fn begin_cycle(&self, first_stage: Phase) -> Result<CycleGuard<'_>> {
        let mut phase = self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *phase != Phase::Idle {
            tracing::warn!(phase = %*phase, "Trigger rejected, cycle already running");
            return Err(Error::CycleInProgress(*phase));
        }
        // Claimed until the guard drops, even if the caller abandons the future
        *phase = first_stage;
        Ok(CycleGuard {
            phase: &self.phase,
            audio: &self.audio,
        })
    }

    fn enter(&self, phase: Phase, report: &mut CycleReport) {
        *self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = phase;
        report.stages.push(phase);
        tracing::debug!(cycle_id = %report.cycle_id, stage = %phase, "Entering stage");
    }

    fn shuffle_assignment(&self) -> Assignment {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let assignment = Assignment::shuffled(&self.roster, self.seat_count(), &mut *rng);
        invariants::assert_assignment_invariants(&assignment, self.seat_count());
        assignment
    }

    fn reveal_order(&self, mode: OrderMode, seat_count: usize) -> RevealOrder {
        let order = match mode {
            OrderMode::Canonical => RevealOrder::canonical(seat_count),
            OrderMode::Random => {
                let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                RevealOrder::random(seat_count, &mut *rng)
            }
            OrderMode::Explicit(sequence) => RevealOrder::resolve(Some(sequence), seat_count),
        };
        invariants::assert_reveal_order_invariants(&order, seat_count);
        order
    }
}

/// Returns the orchestrator to `Idle` when a cycle ends or is dropped.
/// A cycle dropped before Settle still gets its drumroll faded out.
struct CycleGuard<'a> {
    phase: &'a Mutex<Phase>,
    audio: &'a AudioCoordinator,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let abandoned_in = {
            let mut phase = self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let last = *phase;
            *phase = Phase::Idle;
            last
        };
        if abandoned_in == Phase::Settle {
            return;
        }

        tracing::warn!(phase = %abandoned_in, "Reveal cycle abandoned before settle");
        // fade_out spawns onto the runtime; outside one, stop outright
        if tokio::runtime::Handle::try_current().is_ok() {
            self.audio.fade_out(TrackId::Ambient);
        } else {
            self.audio.stop(TrackId::Ambient);
        }
    }
}
