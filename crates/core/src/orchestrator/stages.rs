//! Stage bodies for the reveal timeline
//!
//! Each stage issues grid commands and awaits stage delays in a fixed
//! order. Transient flags (ripple, shift, flash) are cleared by detached
//! timers so they never hold up the main timeline.

use std::time::Duration;

use super::{CycleReport, Orchestrator, Phase};
use crate::audio::TrackId;
use crate::grid::{GridCommand, GridFlag, SeatFlag};
use crate::models::{Assignment, RevealOrder};

impl Orchestrator {
    /// Dim the stage, start the drumroll, and tick down to 1
    pub(super) async fn countdown(&self, report: &mut CycleReport) {
        self.enter(Phase::Countdown, report);
        self.set_dimmed(true);

        let outcome = self.audio.play_best_effort(TrackId::Ambient);
        report.playback.push((TrackId::Ambient, outcome));

        for tick in (1..=self.timing.countdown_from).rev() {
            self.grid.apply(GridCommand::Countdown(Some(tick)));
            self.timer.delay(self.timing.countdown_hold()).await;
        }
        self.grid.apply(GridCommand::Countdown(None));
    }

    /// Flash a decoy assignment: show everything, fade out, clear
    pub(super) async fn quick_preview(&self, assignment: &Assignment, report: &mut CycleReport) {
        self.enter(Phase::QuickPreview, report);
        self.set_dimmed(true);

        for seat in 0..self.seat_count() {
            let student = assignment.occupant(seat).cloned();
            let occupied = student.is_some();
            self.grid.apply(GridCommand::SetOccupant { seat, student });
            self.grid.apply(GridCommand::SetOpacity { seat, opacity: 1.0 });
            if occupied {
                self.set_seat_flag(seat, SeatFlag::NameShown, true);
            }
        }
        self.timer.delay(self.timing.quick_hold()).await;

        for seat in 0..self.seat_count() {
            self.grid.apply(GridCommand::SetOpacity { seat, opacity: 0.0 });
        }
        self.timer.delay(self.timing.quick_fade()).await;

        for seat in 0..self.seat_count() {
            self.grid.apply(GridCommand::SetOpacity { seat, opacity: 1.0 });
            self.grid.apply(GridCommand::SetOccupant { seat, student: None });
            self.set_seat_flag(seat, SeatFlag::Spotlit, false);
        }
        report.previews += 1;
    }

    /// Reveal the definitive assignment seat by seat in `order`
    pub(super) async fn final_reveal(
        &self,
        assignment: Assignment,
        order: RevealOrder,
        report: &mut CycleReport,
    ) {
        self.enter(Phase::FinalReveal, report);
        self.set_dimmed(false);
        self.set_grid_flag(GridFlag::EasedTransitions, true);

        for seat in 0..self.seat_count() {
            self.grid.apply(GridCommand::SetOpacity {
                seat,
                opacity: self.settings.pending_opacity,
            });
            self.set_seat_flag(seat, SeatFlag::Spotlit, false);
        }

        let last_position = order.len().checked_sub(1);
        for (position, &seat) in order.as_slice().iter().enumerate() {
            // Empty seats are skipped before any delay
            let Some(student) = assignment.occupant(seat) else {
                continue;
            };

            self.set_seat_flag(seat, SeatFlag::Spotlit, true);
            self.grid.apply(GridCommand::SetOpacity { seat, opacity: 1.0 });
            self.grid.apply(GridCommand::SetOccupant {
                seat,
                student: Some(student.clone()),
            });

            // Content lands first, entrance styling after the ease delay
            self.set_seat_flag(seat, SeatFlag::NameShown, false);
            self.timer.delay(self.timing.name_ease()).await;
            self.set_seat_flag(seat, SeatFlag::NameShown, true);

            self.set_seat_flag(seat, SeatFlag::Ripple, true);
            self.clear_later(
                Duration::from_millis(self.timing.ripple_ms),
                GridCommand::SetSeatFlag {
                    seat,
                    flag: SeatFlag::Ripple,
                    on: false,
                },
            );

            report.revealed.push(seat);
            tracing::debug!(
                cycle_id = %report.cycle_id,
                seat,
                position,
                name = %student.name,
                "Seat revealed"
            );

            if Some(position) == last_position {
                self.finale(Some(seat), report);
            }

            self.timer.delay(self.timing.reveal_stagger()).await;
        }

        // Last position was an empty seat: still close with a single finale
        if !report.finale_fired && !report.revealed.is_empty() {
            self.finale(None, report);
        }

        report.assignment = assignment;
        report.reveal_order = order;
    }

    /// Show everything at once with no timed stages
    pub(super) fn instant_reveal(&self, assignment: Assignment, report: &mut CycleReport) {
        self.enter(Phase::InstantReveal, report);
        self.set_dimmed(false);

        for seat in 0..self.seat_count() {
            let student = assignment.occupant(seat).cloned();
            let occupied = student.is_some();
            self.grid.apply(GridCommand::SetOccupant { seat, student });
            self.grid.apply(GridCommand::SetOpacity { seat, opacity: 1.0 });
            self.set_seat_flag(seat, SeatFlag::Spotlit, false);
            if occupied {
                self.set_seat_flag(seat, SeatFlag::NameShown, true);
                report.revealed.push(seat);
            }
        }

        let outcome = self.audio.restart_best_effort(TrackId::Sting);
        report.playback.push((TrackId::Sting, outcome));
        self.flash_stage();
        report.finale_fired = true;

        report.assignment = assignment;
    }

    /// Fade the drumroll out; the cycle guard returns the phase to idle
    pub(super) fn settle(&self, report: &mut CycleReport) {
        self.enter(Phase::Settle, report);
        self.audio.fade_out(TrackId::Ambient);
    }

    fn finale(&self, seat: Option<usize>, report: &mut CycleReport) {
        if let Some(seat) = seat {
            self.grid.apply(GridCommand::Pulse {
                seat,
                duration_ms: self.timing.pulse_ms,
            });
        }

        let outcome = self.audio.restart_best_effort(TrackId::Sting);
        report.playback.push((TrackId::Sting, outcome));
        self.flash_stage();

        self.set_grid_flag(GridFlag::Shift, true);
        self.clear_later(
            Duration::from_millis(self.timing.shift_ms),
            GridCommand::SetGridFlag {
                flag: GridFlag::Shift,
                on: false,
            },
        );

        report.finale_fired = true;
        report.finale_seat = seat;
        tracing::debug!(cycle_id = %report.cycle_id, seat = ?seat, "Finale");
    }

    /// Any dim change also cancels a pending flash
    fn set_dimmed(&self, on: bool) {
        self.set_grid_flag(GridFlag::Flash, false);
        self.set_grid_flag(GridFlag::Dimmed, on);
    }

    fn flash_stage(&self) {
        self.set_grid_flag(GridFlag::Dimmed, false);
        self.set_grid_flag(GridFlag::Flash, true);
        self.clear_later(
            Duration::from_millis(self.timing.flash_ms),
            GridCommand::SetGridFlag {
                flag: GridFlag::Flash,
                on: false,
            },
        );
    }

    fn set_seat_flag(&self, seat: usize, flag: SeatFlag, on: bool) {
        self.grid.apply(GridCommand::SetSeatFlag { seat, flag, on });
    }

    fn set_grid_flag(&self, flag: GridFlag, on: bool) {
        self.grid.apply(GridCommand::SetGridFlag { flag, on });
    }

    /// Apply `command` after `after` without blocking the timeline
    fn clear_later(&self, after: Duration, command: GridCommand) {
        let delay = self.timer.delay(after);
        let grid = self.grid.clone();
        tokio::spawn(async move {
            delay.await;
            grid.apply(command);
        });
    }
}
