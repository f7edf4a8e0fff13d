//! Error types for Seat Reveal Core

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load roster from {path}: {source}")]
    RosterLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse roster: {0}")]
    RosterParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A reveal cycle is already in progress ({0})")]
    CycleInProgress(crate::orchestrator::Phase),
}

pub type Result<T> = std::result::Result<T, Error>;
