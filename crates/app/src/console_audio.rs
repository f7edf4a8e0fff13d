//! Console audio cues
//!
//! There is no sound device behind these tracks. They keep playback state
//! (paused, volume) so fades behave like real audio, log cue changes, and
//! the sting rings the terminal bell.

use std::io::Write;
use std::sync::Mutex;

use seat_reveal_core::{AudioTrack, PlaybackError};

#[derive(Debug)]
struct TrackState {
    paused: bool,
    volume: f32,
}

type BellOut = Mutex<Box<dyn Write + Send>>;

/// A named cue printed to the console
pub struct ConsoleTrack {
    name: &'static str,
    bell: Option<BellOut>,
    muted: bool,
    state: Mutex<TrackState>,
}

impl ConsoleTrack {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bell: None,
            muted: false,
            state: Mutex::new(TrackState {
                paused: true,
                volume: 1.0,
            }),
        }
    }

    /// Ring the terminal bell when played
    pub fn with_bell(self) -> Self {
        self.with_bell_to(Box::new(std::io::stderr()))
    }

    fn with_bell_to(mut self, out: Box<dyn Write + Send>) -> Self {
        self.bell = Some(Mutex::new(out));
        self
    }

    fn ring(&self, bell: &BellOut) -> Result<(), PlaybackError> {
        let mut out = bell.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| PlaybackError::Device(e.to_string()))
    }

    /// Refuse to play, the way a browser blocks autoplay
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, TrackState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioTrack for ConsoleTrack {
    fn play(&self) -> Result<(), PlaybackError> {
        if self.muted {
            return Err(PlaybackError::NotAllowed(format!("{} is muted", self.name)));
        }

        // A failed bell leaves the track paused
        if let Some(bell) = &self.bell {
            self.ring(bell)?;
        }

        self.state().paused = false;
        tracing::info!(track = self.name, "Cue playing");
        Ok(())
    }

    fn pause(&self) {
        self.state().paused = true;
        tracing::debug!(track = self.name, "Cue paused");
    }

    fn rewind(&self) {
        tracing::trace!(track = self.name, "Cue rewound");
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    fn volume(&self) -> f32 {
        self.state().volume
    }

    fn set_volume(&self, volume: f32) {
        self.state().volume = volume.clamp(0.0, 1.0);
    }
}
