//! Terminal seat grid
//!
//! Keeps a view model of every seat and grid flag, and draws the 3-row
//! classroom as a text table. Aisles (missing columns) stay blank.

use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use seat_reveal_core::{GridCommand, GridFlag, SeatFlag, SeatGrid, SeatLayout};

use crate::platform::TerminalMode;

/// Characters per seat cell, brackets included
const CELL_WIDTH: usize = 12;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone)]
struct SeatView {
    name: Option<String>,
    opacity: f32,
    spotlit: bool,
    ripple: bool,
    name_shown: bool,
}

impl Default for SeatView {
    fn default() -> Self {
        Self {
            name: None,
            opacity: 1.0,
            spotlit: false,
            ripple: false,
            name_shown: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GridView {
    seats: Vec<SeatView>,
    dimmed: bool,
    flash: bool,
    shift: bool,
    countdown: Option<u32>,
    /// Pulsing seat and when the pulse ends
    pulse: Option<(usize, Instant)>,
}

impl GridView {
    fn is_pulsing(&self, seat: usize) -> bool {
        self.pulse
            .is_some_and(|(pulsing, until)| pulsing == seat && Instant::now() < until)
    }
}

struct Inner<W> {
    view: GridView,
    out: W,
}

/// Seat grid drawn to a terminal (or any writer)
pub struct TerminalGrid<W: Write + Send> {
    layout: SeatLayout,
    mode: TerminalMode,
    inner: Mutex<Inner<W>>,
}

impl<W: Write + Send> TerminalGrid<W> {
    pub fn new(layout: SeatLayout, mode: TerminalMode, out: W) -> Self {
        let view = GridView {
            seats: vec![SeatView::default(); layout.seat_count()],
            ..GridView::default()
        };
        Self {
            layout,
            mode,
            inner: Mutex::new(Inner { view, out }),
        }
    }

    /// Draw the current state unconditionally
    pub fn redraw(&self) {
        let mut inner = self.lock();
        self.draw(&mut inner);
    }

    /// Names currently on screen, in seat order
    #[cfg(test)]
    pub fn visible_names(&self) -> Vec<Option<String>> {
        self.lock()
            .view
            .seats
            .iter()
            .map(|s| s.name.clone().filter(|_| s.name_shown && s.opacity > 0.0))
            .collect()
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .out
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Terminal grid mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn draw(&self, inner: &mut Inner<W>) {
        let frame = render_frame(&self.layout, &inner.view, self.mode.is_ansi());
        let written = if self.mode.is_ansi() {
            write!(inner.out, "{}{}", CLEAR_SCREEN, frame)
        } else {
            writeln!(inner.out, "{}", frame)
        };
        let result = written.and_then(|_| inner.out.flush());

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to draw seat grid");
        }
    }

    /// Plain output only prints countdown ticks and the finished grid
    fn write_plain_event(&self, inner: &mut Inner<W>, command: &GridCommand) {
        let result = match command {
            GridCommand::Countdown(Some(tick)) => writeln!(inner.out, "  {} ...", tick),
            GridCommand::SetGridFlag {
                flag: GridFlag::Flash,
                on: true,
            } => {
                self.draw(inner);
                return;
            }
            _ => return,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write countdown");
        }
    }
}

impl<W: Write + Send> SeatGrid for TerminalGrid<W> {
    fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    fn apply(&self, command: GridCommand) {
        let mut inner = self.lock();
        let view = &mut inner.view;

        match &command {
            GridCommand::SetOccupant { seat, student } => {
                if let Some(s) = view.seats.get_mut(*seat) {
                    s.name = student.as_ref().map(|st| display_name(&st.name));
                    if student.is_none() {
                        s.name_shown = false;
                    }
                }
            }
            GridCommand::SetOpacity { seat, opacity } => {
                if let Some(s) = view.seats.get_mut(*seat) {
                    s.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            GridCommand::SetSeatFlag { seat, flag, on } => {
                if let Some(s) = view.seats.get_mut(*seat) {
                    match flag {
                        SeatFlag::Spotlit => s.spotlit = *on,
                        SeatFlag::Ripple => s.ripple = *on,
                        SeatFlag::NameShown => s.name_shown = *on,
                    }
                }
            }
            GridCommand::SetGridFlag { flag, on } => match flag {
                GridFlag::Dimmed => {
                    view.dimmed = *on;
                    view.pulse = None;
                }
                GridFlag::Flash => view.flash = *on,
                GridFlag::Shift => view.shift = *on,
                GridFlag::EasedTransitions => {}
            },
            GridCommand::Pulse { seat, duration_ms } => {
                let until = Instant::now() + Duration::from_millis(*duration_ms);
                view.pulse = Some((*seat, until));
            }
            GridCommand::Countdown(tick) => view.countdown = *tick,
        }

        if self.mode.is_ansi() {
            self.draw(&mut inner);
        } else {
            self.write_plain_event(&mut inner, &command);
        }
    }
}

/// Strip control characters so a roster entry cannot move the cursor
fn display_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_control()).collect()
}

fn render_frame(layout: &SeatLayout, view: &GridView, ansi: bool) -> String {
    let (rows, cols) = layout.extent();
    let mut out = String::new();

    let header = match (view.countdown, view.flash) {
        (Some(tick), _) => format!("{:^width$}", tick, width = CELL_WIDTH * 3),
        (None, true) => format!("{:^width$}", "* * *  T A D A  * * *", width = CELL_WIDTH * 3),
        (None, false) if view.dimmed => format!("{:^width$}", "(lights down)", width = CELL_WIDTH * 3),
        _ => String::new(),
    };
    if ansi && view.flash {
        out.push_str(&format!("{}{}{}\n\n", REVERSE, header, RESET));
    } else {
        out.push_str(&format!("{}\n\n", header));
    }

    let indent = if view.shift { " " } else { "" };
    for row in 1..=rows {
        out.push_str(indent);
        for col in 1..=cols {
            let seat = layout
                .slots()
                .iter()
                .position(|s| s.row == row && s.col == col);
            let cell = match seat {
                Some(index) => render_cell(&view.seats[index], view, index, ansi),
                None => " ".repeat(CELL_WIDTH / 2),
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }

    out
}

fn render_cell(seat: &SeatView, view: &GridView, index: usize, ansi: bool) -> String {
    let inner_width = CELL_WIDTH - 2;
    let label = if seat.opacity <= 0.0 {
        String::new()
    } else {
        match (&seat.name, seat.name_shown) {
            (Some(name), true) => truncate(name, inner_width),
            (Some(_), false) => "...".to_string(),
            (None, _) if seat.opacity < 1.0 => ".".to_string(),
            (None, _) => String::new(),
        }
    };

    let (open, close) = if view.is_pulsing(index) && seat.spotlit {
        ('<', '>')
    } else if seat.ripple {
        ('(', ')')
    } else if seat.spotlit {
        ('[', ']')
    } else {
        (' ', ' ')
    };
    let text = format!("{}{:^width$}{}", open, label, close, width = inner_width);

    if !ansi {
        return text;
    }
    if seat.spotlit {
        format!("{}{}{}", BOLD, text, RESET)
    } else if view.dimmed || seat.opacity < 1.0 {
        format!("{}{}{}", DIM, text, RESET)
    } else {
        text
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('~');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seat_reveal_core::Student;

    fn plain_grid() -> TerminalGrid<Vec<u8>> {
        TerminalGrid::new(SeatLayout::classroom(), TerminalMode::Plain, Vec::new())
    }

    fn reveal(grid: &TerminalGrid<Vec<u8>>, seat: usize, name: &str) {
        grid.apply(GridCommand::SetOccupant {
            seat,
            student: Some(Student::new(name)),
        });
        grid.apply(GridCommand::SetSeatFlag {
            seat,
            flag: SeatFlag::NameShown,
            on: true,
        });
    }

    #[test]
    fn test_visible_names_follow_commands() {
        let grid = plain_grid();
        reveal(&grid, 0, "Ada");
        grid.apply(GridCommand::SetOccupant {
            seat: 1,
            student: Some(Student::new("Grace")),
        });

        let names = grid.visible_names();
        assert_eq!(names[0].as_deref(), Some("Ada"));
        // Written but not yet shown
        assert_eq!(names[1], None);

        grid.apply(GridCommand::SetOpacity { seat: 0, opacity: 0.0 });
        assert_eq!(grid.visible_names()[0], None);
    }

    #[test]
    fn test_plain_mode_prints_ticks_and_final_frame() {
        let grid = plain_grid();
        grid.apply(GridCommand::Countdown(Some(5)));
        grid.apply(GridCommand::Countdown(None));
        reveal(&grid, 13, "Linus");
        grid.apply(GridCommand::SetGridFlag {
            flag: GridFlag::Flash,
            on: true,
        });

        let output = String::from_utf8(grid.into_writer()).unwrap();
        assert!(output.contains("5 ..."));
        assert!(output.contains("T A D A"));
        assert!(output.contains("Linus"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_frame_layout_has_three_rows_with_aisles() {
        let layout = SeatLayout::classroom();
        let view = GridView {
            seats: vec![SeatView::default(); layout.seat_count()],
            ..GridView::default()
        };
        let frame = render_frame(&layout, &view, false);
        let rows: Vec<&str> = frame.lines().skip(2).collect();
        assert_eq!(rows.len(), 3);
        // Six seats and two aisles, versus four seats and four aisle gaps
        assert_eq!(rows[0].len(), 6 * CELL_WIDTH + 2 * CELL_WIDTH / 2);
        assert_eq!(rows[2].len(), 4 * CELL_WIDTH + 4 * CELL_WIDTH / 2);
    }

    fn spotlight(grid: &TerminalGrid<Vec<u8>>, seat: usize) {
        grid.apply(GridCommand::SetSeatFlag {
            seat,
            flag: SeatFlag::Spotlit,
            on: true,
        });
    }

    #[test]
    fn test_pulse_expires_after_its_duration() {
        let grid = plain_grid();
        reveal(&grid, 0, "Ada");
        spotlight(&grid, 0);

        grid.apply(GridCommand::Pulse {
            seat: 0,
            duration_ms: 60_000,
        });
        assert!(grid.lock().view.is_pulsing(0));
        assert!(!grid.lock().view.is_pulsing(1));

        grid.apply(GridCommand::Pulse {
            seat: 0,
            duration_ms: 0,
        });
        let inner = grid.lock();
        assert!(!inner.view.is_pulsing(0));
        let frame = render_frame(&SeatLayout::classroom(), &inner.view, false);
        assert!(!frame.contains('<'));
    }

    #[test]
    fn test_dimming_clears_pulse() {
        let grid = plain_grid();
        reveal(&grid, 4, "Grace");
        spotlight(&grid, 4);
        grid.apply(GridCommand::Pulse {
            seat: 4,
            duration_ms: 60_000,
        });

        // Next cycle starts by dimming the stage
        grid.apply(GridCommand::SetGridFlag {
            flag: GridFlag::Dimmed,
            on: true,
        });
        spotlight(&grid, 4);
        assert_eq!(grid.lock().view.pulse, None);
    }

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(display_name("Ada\x1b[2J"), "Ada[2J");
        assert_eq!(truncate("Bartholomew Jr.", 10), "Bartholom~");
        assert_eq!(truncate("Ada", 10), "Ada");
    }

    #[test]
    fn test_ansi_mode_redraws() {
        let grid = TerminalGrid::new(SeatLayout::classroom(), TerminalMode::Ansi, Vec::new());
        reveal(&grid, 2, "Grace");
        let output = String::from_utf8(grid.into_writer()).unwrap();
        assert!(output.contains(CLEAR_SCREEN));
        assert!(output.contains("Grace"));
    }
}
