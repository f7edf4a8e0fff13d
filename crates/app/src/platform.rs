//! Terminal capability detection
//!
//! The grid redraws in place on an ANSI terminal. When stdout is piped or
//! `NO_COLOR` is set, it falls back to printing plain frames at the
//! countdown ticks and the finale only.

use std::env;
use std::io::IsTerminal;

/// How the terminal grid should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    /// Interactive terminal: clear and redraw with ANSI styling
    Ansi,
    /// Pipe, file, or `NO_COLOR`: plain text, fewer frames
    Plain,
}

impl TerminalMode {
    /// Detect the mode for the current stdout
    pub fn detect() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let dumb = env::var("TERM").map(|t| t == "dumb").unwrap_or(false);

        if std::io::stdout().is_terminal() && !no_color && !dumb {
            TerminalMode::Ansi
        } else {
            TerminalMode::Plain
        }
    }

    pub fn is_ansi(&self) -> bool {
        matches!(self, TerminalMode::Ansi)
    }
}

impl std::fmt::Display for TerminalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalMode::Ansi => write!(f, "ANSI"),
            TerminalMode::Plain => write!(f, "Plain"),
        }
    }
}

/// Log terminal information at startup
pub fn log_platform_info() -> TerminalMode {
    let mode = TerminalMode::detect();
    tracing::info!(terminal_mode = %mode, "Terminal mode detected");

    if let Ok(term) = env::var("TERM") {
        tracing::debug!(term = %term, "TERM");
    }

    mode
}
