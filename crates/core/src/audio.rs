//! Audio coordinator for the ambient drumroll and the finale sting
//!
//! Playback is best-effort: a track that refuses to start (autoplay policy,
//! missing asset) is logged and reported as [`PlaybackOutcome::Unavailable`],
//! never as an error to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::AudioConfig;
use crate::timer::StageTimer;

/// Volumes at or below this are treated as silent, absorbing float drift
/// from repeated subtraction.
const SILENCE: f32 = 1e-4;

/// The two cues the reveal uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackId {
    /// Drumroll looping under the countdown and reveal
    Ambient,
    /// One-shot "tada" at the finale
    Sting,
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Ambient => write!(f, "ambient"),
            TrackId::Sting => write!(f, "sting"),
        }
    }
}

/// Why a track could not start
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    #[error("Audio asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Result of a best-effort start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Started,
    Unavailable(String),
}

impl PlaybackOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlaybackOutcome::Started)
    }
}

/// A playable audio asset. Implementations use interior mutability; volume
/// is in `0.0..=1.0`.
pub trait AudioTrack: Send + Sync {
    fn play(&self) -> Result<(), PlaybackError>;
    fn pause(&self);
    /// Seek back to the start
    fn rewind(&self);
    fn is_paused(&self) -> bool;
    fn volume(&self) -> f32;
    fn set_volume(&self, volume: f32);
}

/// Starts, restarts, and fades the reveal's two tracks
pub struct AudioCoordinator {
    ambient: Arc<dyn AudioTrack>,
    sting: Arc<dyn AudioTrack>,
    timer: Arc<dyn StageTimer>,
    settings: AudioConfig,
    /// In-flight fade per track; a new fade aborts the old one
    fades: Mutex<HashMap<TrackId, JoinHandle<()>>>,
}

impl AudioCoordinator {
    pub fn new(
        ambient: Arc<dyn AudioTrack>,
        sting: Arc<dyn AudioTrack>,
        timer: Arc<dyn StageTimer>,
        settings: AudioConfig,
    ) -> Self {
        Self {
            ambient,
            sting,
            timer,
            settings,
            fades: Mutex::new(HashMap::new()),
        }
    }

    pub fn track(&self, id: TrackId) -> &Arc<dyn AudioTrack> {
        match id {
            TrackId::Ambient => &self.ambient,
            TrackId::Sting => &self.sting,
        }
    }

    /// Start a track, swallowing any failure. A fade still running on the
    /// track is cancelled first so it cannot pause the new playback.
    pub fn play_best_effort(&self, id: TrackId) -> PlaybackOutcome {
        self.cancel_fade(id);
        match self.track(id).play() {
            Ok(()) => {
                tracing::debug!(track = %id, "Playback started");
                PlaybackOutcome::Started
            }
            Err(e) => {
                tracing::warn!(track = %id, error = %e, "Playback unavailable, continuing without audio");
                PlaybackOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// Rewind and play from the top
    pub fn restart_best_effort(&self, id: TrackId) -> PlaybackOutcome {
        self.track(id).rewind();
        self.play_best_effort(id)
    }

    /// Fade a playing track to silence, then pause, rewind, and restore full
    /// volume. Returns `false` when the track was not playing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fade_out(&self, id: TrackId) -> bool {
        let track = self.track(id).clone();
        if track.is_paused() {
            tracing::debug!(track = %id, "Fade skipped, track not playing");
            return false;
        }

        let mut fades = self.fades.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Fade table mutex poisoned, recovering");
            poisoned.into_inner()
        });

        if let Some(previous) = fades.remove(&id) {
            if !previous.is_finished() {
                tracing::debug!(track = %id, "Superseding in-flight fade");
            }
            previous.abort();
        }

        let timer = self.timer.clone();
        let step = self.settings.fade_step.clamp(SILENCE, 1.0);
        let interval = Duration::from_millis(self.settings.fade_interval_ms);

        let handle = tokio::spawn(async move {
            loop {
                timer.delay(interval).await;
                let mut next = (track.volume() - step).max(0.0);
                if next <= SILENCE {
                    next = 0.0;
                }
                track.set_volume(next);
                if next == 0.0 {
                    track.pause();
                    track.rewind();
                    track.set_volume(1.0);
                    tracing::debug!(track = %id, "Fade complete");
                    break;
                }
            }
        });
        fades.insert(id, handle);
        true
    }

    /// Abort an in-flight fade on `id` and put the volume back to full.
    /// Returns `true` when a running fade was stopped.
    pub fn cancel_fade(&self, id: TrackId) -> bool {
        let previous = self
            .fades
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id);

        match previous {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                self.track(id).set_volume(1.0);
                tracing::debug!(track = %id, "In-flight fade cancelled");
                true
            }
            _ => false,
        }
    }

    /// Stop `id` immediately: cancel any fade, pause, and rewind
    pub fn stop(&self, id: TrackId) {
        self.cancel_fade(id);
        let track = self.track(id);
        if !track.is_paused() {
            track.pause();
            track.rewind();
        }
    }

    /// Whether a fade is still running on `id`
    pub fn is_fading(&self, id: TrackId) -> bool {
        self.fades
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AudioCoordinator {
    fn drop(&mut self) {
        if let Ok(fades) = self.fades.get_mut() {
            for (_, handle) in fades.drain() {
                handle.abort();
            }
        }
    }
}
