//! Seat Reveal - randomized classroom seating, revealed with a drumroll
//!
//! Loads a roster, draws the classroom grid in the terminal, and runs
//! staged or instant reveals on demand.

use std::sync::Arc;

use seat_reveal_core::{Error, Orchestrator, SeatLayout, TokioTimer, TrackId, Trigger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod console_audio;
mod platform;
mod state;
mod terminal;

use clap::Parser;
use cli::{parse_command, Cli, Command, HELP};
use console_audio::ConsoleTrack;
use terminal::TerminalGrid;

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Seat Reveal");

    let mode = platform::log_platform_info();

    let layout = SeatLayout::classroom();

    // Roster and config are loaded once; failure aborts before any animation
    let app_state = match state::AppState::load(&cli, layout.seat_count()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            eprintln!("Couldn't start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        roster = %app_state.roster_path.display(),
        config = ?app_state.config_path,
        students = app_state.roster.len(),
        "Ready"
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let grid = Arc::new(TerminalGrid::new(layout, mode, std::io::stdout()));
    let ambient = Arc::new(ConsoleTrack::new("drumroll").muted(cli.mute));
    let sting = Arc::new(ConsoleTrack::new("tada").with_bell().muted(cli.mute));

    let cycles = app_state.initial_cycles(&cli);
    let first_trigger = cli.trigger(cycles);

    runtime.block_on(async move {
        grid.redraw();

        let orchestrator = Orchestrator::new(
            app_state.roster,
            grid,
            ambient,
            sting,
            Arc::new(TokioTimer),
            &app_state.config,
        );

        if cli.once {
            run_trigger(&orchestrator, first_trigger).await;
            // Let the drumroll fade finish before exiting
            wait_for_fade(&orchestrator).await;
            return;
        }

        interactive(&orchestrator, cycles).await;
    });
}

/// Read trigger lines from stdin until `q` or EOF. Each reveal finishes
/// before the next line is read.
async fn interactive(orchestrator: &Orchestrator, mut cycles: u32) {
    println!("{}", HELP);
    println!("shuffles: {}", cycles);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input");
                break;
            }
        };

        match parse_command(&line, cycles) {
            Command::Reveal(trigger) => run_trigger(orchestrator, trigger).await,
            Command::SetCycles(n) => {
                cycles = n;
                println!("shuffles: {}", cycles);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(input) => println!("unknown input {:?}, ? for help", input),
        }
    }

    wait_for_fade(orchestrator).await;
    tracing::info!("Exiting");
}

async fn run_trigger(orchestrator: &Orchestrator, trigger: Trigger) {
    match orchestrator.trigger(trigger).await {
        Ok(report) => {
            tracing::info!(
                cycle_id = %report.cycle_id,
                seated = report.assignment.occupied_count(),
                "Reveal complete"
            );
        }
        Err(Error::CycleInProgress(phase)) => {
            tracing::warn!(phase = %phase, "Reveal already running, trigger ignored");
        }
        Err(e) => tracing::error!(error = %e, "Reveal failed"),
    }
}

async fn wait_for_fade(orchestrator: &Orchestrator) {
    while orchestrator.audio().is_fading(TrackId::Ambient) {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}
