//! Playback worker: a thread owning the rodio output stream.
//!
//! The thread is commanded over an mpsc channel ([`PlayerCmd`]) and reports
//! end-of-stream and decode failures back asynchronously ([`PlayerEvent`]).
//! It knows nothing about the playlist; deciding what plays next is the
//! navigation cursor's job.

mod sink;
mod thread;
mod types;

pub use types::{PlaybackHandle, PlaybackInfo, PlayerCmd, PlayerEvent};

use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thread::spawn_player_thread;

pub struct Player {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the player thread. Events (track ended, playback errors) are
    /// delivered on `events`.
    pub fn new(events: Sender<PlayerEvent>, initial_volume: f32) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let handle = spawn_player_thread(rx, events, playback_info.clone(), initial_volume);

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    /// Clone of the command sender, handed to whoever issues play commands.
    pub fn sender(&self) -> Sender<PlayerCmd> {
        self.tx.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback and wait for the thread to exit.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

#[cfg(test)]
mod tests;
