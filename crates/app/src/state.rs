//! Application state: resolved configuration and the loaded roster

use std::path::PathBuf;

use seat_reveal_core::{Result, RevealConfig, Roster};

use crate::cli::Cli;

/// Everything the app needs before the first reveal
pub struct AppState {
    pub config: RevealConfig,
    /// Where the config came from, if anywhere
    pub config_path: Option<PathBuf>,
    pub roster_path: PathBuf,
    pub roster: Roster,
}

impl AppState {
    /// Resolve config, then load the roster once. A roster that cannot be
    /// read is fatal: nothing is animated without it.
    pub fn load(cli: &Cli, seat_count: usize) -> Result<Self> {
        let (config, config_path) = match &cli.config {
            Some(path) => (RevealConfig::load_from_file(path)?, Some(path.clone())),
            None => match RevealConfig::default_path() {
                Some(path) => {
                    let config = RevealConfig::load_or_default(&path)?;
                    (config, Some(path).filter(|p| p.exists()))
                }
                None => (RevealConfig::default(), None),
            },
        };

        let roster_path = cli
            .roster
            .clone()
            .unwrap_or_else(|| config.roster_path.clone());
        let roster = Roster::load_from_file(&roster_path)?.truncate_to(seat_count);

        Ok(Self {
            config,
            config_path,
            roster_path,
            roster,
        })
    }

    /// Repeat count for the first trigger: CLI flag, then config
    pub fn initial_cycles(&self, cli: &Cli) -> u32 {
        cli.cycles
            .unwrap_or(self.config.reveal.default_cycles)
            .max(1)
    }
}
