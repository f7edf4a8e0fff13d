//! Command line arguments and interactive trigger parsing

use std::path::PathBuf;

use clap::Parser;
use seat_reveal_core::Trigger;

/// Randomized classroom seat reveal
#[derive(Debug, Clone, Parser)]
#[command(name = "seat-reveal", version, about)]
pub struct Cli {
    /// Roster JSON file (overrides the config file)
    #[arg(long, env = "SEAT_REVEAL_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Config TOML file; defaults to the per-user config location
    #[arg(long, env = "SEAT_REVEAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Total shuffles including the final reveal
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: Option<u32>,

    /// Skip countdown and previews, show the result at once
    #[arg(long)]
    pub instant: bool,

    /// Reveal seats in random order instead of row by row
    #[arg(long)]
    pub random_order: bool,

    /// Run a single reveal and exit
    #[arg(long)]
    pub once: bool,

    /// Start with audio cues disabled
    #[arg(long)]
    pub mute: bool,
}

impl Cli {
    pub fn trigger(&self, default_cycles: u32) -> Trigger {
        build_trigger(self.cycles.unwrap_or(default_cycles), self.instant, self.random_order)
    }
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reveal(Trigger),
    /// Change the repeat count without revealing
    SetCycles(u32),
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Enter      staged reveal
i          instant reveal
r          random reveal order (combine: `r 3`, `i r`)
<number>   set how many shuffles to show (minimum 1)
?          this help
q          quit";

/// Parse an input line. Tokens may combine flags with a repeat count,
/// e.g. `r 4`; a lone number only changes the repeat count.
pub fn parse_command(line: &str, cycles: u32) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        [] => return Command::Reveal(build_trigger(cycles, false, false)),
        ["q"] | ["quit"] | ["exit"] => return Command::Quit,
        ["?"] | ["h"] | ["help"] => return Command::Help,
        [n] => {
            if let Ok(n) = n.parse::<u32>() {
                return Command::SetCycles(n.max(1));
            }
        }
        _ => {}
    }

    let mut instant = false;
    let mut random = false;
    let mut count = cycles;
    for token in tokens {
        match token {
            "i" | "instant" => instant = true,
            "r" | "random" => random = true,
            other => match other.parse::<u32>() {
                Ok(n) => count = n.max(1),
                Err(_) => return Command::Unknown(line.trim().to_string()),
            },
        }
    }

    Command::Reveal(build_trigger(count, instant, random))
}

fn build_trigger(cycles: u32, instant: bool, random_order: bool) -> Trigger {
    let trigger = if instant {
        Trigger {
            cycles,
            ..Trigger::instant()
        }
    } else {
        Trigger::staged(cycles)
    };
    if random_order {
        trigger.with_random_order()
    } else {
        trigger
    }
}
