//! Playback command and event types shared with the rest of the app.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum PlayerCmd {
    /// Start playing the given file from the beginning.
    Play(PathBuf),
    /// Stop playback and drop the current sink.
    Stop,
    /// Pause, or resume at the offset recorded when pausing.
    TogglePause,
    /// Set the output volume (clamped to 0.0–1.0).
    SetVolume(f32),
    /// Seek by the given number of seconds (positive or negative).
    SeekBy(i64),
    /// Shut down the player thread.
    Quit,
}

/// Asynchronous notifications emitted by the player thread.
///
/// The player performs no auto-advance of its own; whoever consumes
/// `TrackEnded` decides what plays next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The current track reached end of stream.
    TrackEnded,
    /// Opening or decoding a file failed.
    PlaybackError(String),
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Whether playback is currently active.
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Wall-clock position accounting for the current track.
///
/// Tracks elapsed time as accumulated duration plus the time since the last
/// resume, so pausing freezes the position and seeking can re-seed it.
#[derive(Debug, Default)]
pub(super) struct PositionClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PositionClock {
    /// Start counting from the given offset.
    pub(super) fn start_at(&mut self, offset: Duration) {
        self.accumulated = offset;
        self.started_at = Some(Instant::now());
    }

    /// Freeze the position.
    pub(super) fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
    }

    /// Continue counting from the frozen position.
    pub(super) fn resume(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub(super) fn reset(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    pub(super) fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |s| s.elapsed())
    }
}
