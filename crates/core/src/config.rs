//! Reveal configuration schema and loader
//!
//! Defines the TOML format for timing, audio, and roster settings. Every
//! field has a default, so an empty file (or no file at all) is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Roster file (JSON array of `{ "name": ... }`)
    pub roster_path: PathBuf,
    /// Stage pacing
    pub timing: TimingConfig,
    /// Audio fade behaviour
    pub audio: AudioConfig,
    /// Reveal defaults
    pub reveal: RevealSettings,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("students.json"),
            timing: TimingConfig::default(),
            audio: AudioConfig::default(),
            reveal: RevealSettings::default(),
        }
    }
}

/// Stage durations in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Hold between countdown ticks
    pub countdown_hold_ms: u64,
    /// First tick shown; counts down to 1
    pub countdown_from: u32,
    /// How long a preview shuffle stays visible
    pub quick_hold_ms: u64,
    /// Preview fade to transparent
    pub quick_fade_ms: u64,
    /// Gap between seats in the final reveal
    pub reveal_stagger_ms: u64,
    /// Delay between writing a name and showing it
    pub name_ease_ms: u64,
    pub ripple_ms: u64,
    pub shift_ms: u64,
    pub flash_ms: u64,
    /// Finale scale micro-animation
    pub pulse_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_hold_ms: 1000,
            countdown_from: 5,
            quick_hold_ms: 550,
            quick_fade_ms: 250,
            reveal_stagger_ms: 120,
            name_ease_ms: 60,
            ripple_ms: 650,
            shift_ms: 650,
            flash_ms: 380,
            pulse_ms: 350,
        }
    }
}

impl TimingConfig {
    pub fn countdown_hold(&self) -> Duration {
        Duration::from_millis(self.countdown_hold_ms)
    }

    pub fn quick_hold(&self) -> Duration {
        Duration::from_millis(self.quick_hold_ms)
    }

    pub fn quick_fade(&self) -> Duration {
        Duration::from_millis(self.quick_fade_ms)
    }

    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }

    pub fn name_ease(&self) -> Duration {
        Duration::from_millis(self.name_ease_ms)
    }
}

/// Audio fade-out settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Volume removed per fade tick
    pub fade_step: f32,
    pub fade_interval_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_step: 0.05,
            fade_interval_ms: 50,
        }
    }
}

/// Reveal defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Repeat count used when the trigger does not give one
    pub default_cycles: u32,
    /// Seat opacity while waiting to be revealed
    pub pending_opacity: f32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            default_cycles: 1,
            pending_opacity: 0.35,
        }
    }
}

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl RevealConfig {
    /// Load a config file that must exist
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RevealConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Per-user config location, e.g. `~/.config/seat-reveal/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "onyx", "seat-reveal")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.audio.fade_step > 0.0 && self.audio.fade_step <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "audio.fade_step must be in (0, 1], got {}",
                self.audio.fade_step
            )));
        }
        if self.audio.fade_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "audio.fade_interval_ms must be positive".into(),
            ));
        }
        if self.reveal.default_cycles == 0 {
            return Err(ConfigError::Invalid(
                "reveal.default_cycles must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.pending_opacity) {
            return Err(ConfigError::Invalid(format!(
                "reveal.pending_opacity must be in [0, 1], got {}",
                self.reveal.pending_opacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = RevealConfig::from_toml("").unwrap();
        assert_eq!(config, RevealConfig::default());
        assert_eq!(config.timing.countdown_hold_ms, 1000);
        assert_eq!(config.timing.reveal_stagger_ms, 120);
        assert_eq!(config.roster_path, PathBuf::from("students.json"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
roster_path = "class-b.json"

[timing]
countdown_hold_ms = 400
countdown_from = 3

[audio]
fade_step = 0.1
"#;
        let config = RevealConfig::from_toml(toml).unwrap();
        assert_eq!(config.roster_path, PathBuf::from("class-b.json"));
        assert_eq!(config.timing.countdown_hold_ms, 400);
        assert_eq!(config.timing.countdown_from, 3);
        // Untouched fields keep defaults
        assert_eq!(config.timing.quick_hold_ms, 550);
        assert_eq!(config.audio.fade_step, 0.1);
        assert_eq!(config.audio.fade_interval_ms, 50);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = RevealConfig::from_toml("[reveal]\ndefault_cycles = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = RevealConfig::from_toml("[audio]\nfade_step = 0.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = RevealConfig::from_toml("[timing\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(
            RevealConfig::load_from_file(&path),
            Err(ConfigError::NotFound(_))
        ));
        assert_eq!(
            RevealConfig::load_or_default(&path).unwrap(),
            RevealConfig::default()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timing]\nreveal_stagger_ms = 10\n").unwrap();

        let config = RevealConfig::load_from_file(&path).unwrap();
        assert_eq!(config.timing.reveal_stagger(), Duration::from_millis(10));
    }
}
