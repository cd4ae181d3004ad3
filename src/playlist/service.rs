//! The playlist service: store + navigation cursor behind one lock.
//!
//! `PlaylistService` owns the circular store, the `current` cursor and the
//! loop/shuffle flags together, so a playlist replacement can never leave a
//! cursor pointing into freed entries: `clear`, cursor reset and generation
//! bump happen in the same critical section. Navigation issues play commands
//! to the player thread over an mpsc channel and reports a status outcome to
//! the caller.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::mpsc::Sender;

use tracing::{debug, info};

use crate::player::PlayerCmd;

use super::store::{EntryId, Playlist};

/// What a navigation operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// A play command for this song was issued.
    Playing(String),
    /// The store is empty or no track is selected; nothing was mutated.
    NothingToPlay,
}

/// One-lock snapshot of the playlist for rendering.
#[derive(Debug, Clone)]
pub struct PlaylistView {
    /// Songs in `next`-order from `head`.
    pub songs: Vec<String>,
    /// Position of the current track within `songs`, if any.
    pub current: Option<usize>,
    pub loop_enabled: bool,
    pub shuffle_enabled: bool,
    pub music_dir: PathBuf,
}

struct State {
    list: Playlist,
    current: Option<EntryId>,
    loop_enabled: bool,
    shuffle_enabled: bool,
    /// Bumped on every wholesale replacement; appends tagged with an older
    /// generation are dropped.
    generation: u64,
    music_dir: PathBuf,
}

pub struct PlaylistService {
    state: Mutex<State>,
    player: Sender<PlayerCmd>,
}

impl PlaylistService {
    pub fn new(player: Sender<PlayerCmd>, music_dir: PathBuf) -> Self {
        Self {
            state: Mutex::new(State {
                list: Playlist::new(),
                current: None,
                loop_enabled: false,
                shuffle_enabled: false,
                generation: 0,
                music_dir,
            }),
            player,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves the data structurally sound
        // (every mutation is a single atomic edit), so recover from poison.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue a play command for `id` and report the song name.
    fn play_entry(&self, state: &State, id: EntryId) -> NavOutcome {
        let song = state.list.song(id).to_string();
        let _ = self.player.send(PlayerCmd::Play(state.music_dir.join(&song)));
        NavOutcome::Playing(song)
    }

    /// Append one song at the tail.
    pub fn append(&self, song: &str) {
        let mut state = self.state();
        state.list.insert_tail(song);
    }

    /// Current replacement generation, sampled before starting a download.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Append a downloaded song, unless the playlist was wholesale-replaced
    /// after `generation` was sampled. A stale append is dropped silently and
    /// reported as `false`.
    pub fn append_downloaded(&self, song: &str, generation: u64) -> bool {
        let mut state = self.state();
        if state.generation != generation {
            debug!(song, "dropping download that raced a playlist replacement");
            return false;
        }
        state.list.insert_tail(song);
        true
    }

    /// Replace the whole playlist: clear, bulk insert in order, reset the
    /// cursor. One critical section, so no reader can observe the cursor
    /// pointing into the old entries.
    pub fn replace_with<I, S>(&self, songs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state();
        state.list.clear();
        state.current = None;
        state.generation += 1;
        for song in songs {
            state.list.insert_tail(song);
        }
        info!(len = state.list.len(), "playlist replaced");
    }

    pub fn set_music_dir(&self, dir: PathBuf) {
        self.state().music_dir = dir;
    }

    pub fn music_dir(&self) -> PathBuf {
        self.state().music_dir.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.state().list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state().list.len()
    }

    /// Songs in playback order, for display or persistence.
    pub fn songs(&self) -> Vec<String> {
        self.state().list.snapshot_order()
    }

    pub fn now_playing(&self) -> Option<String> {
        let state = self.state();
        state.current.map(|id| state.list.song(id).to_string())
    }

    pub fn loop_enabled(&self) -> bool {
        self.state().loop_enabled
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.state().shuffle_enabled
    }

    /// Snapshot everything the UI needs under a single lock acquisition.
    pub fn view(&self) -> PlaylistView {
        let state = self.state();
        let ids = state.list.ids_in_order();
        let current = state
            .current
            .and_then(|cur| ids.iter().position(|&id| id == cur));
        PlaylistView {
            songs: ids.iter().map(|&id| state.list.song(id).to_string()).collect(),
            current,
            loop_enabled: state.loop_enabled,
            shuffle_enabled: state.shuffle_enabled,
            music_dir: state.music_dir.clone(),
        }
    }

    /// Select `head` and play it. Used at startup and to (re)start playback.
    pub fn play_head(&self) -> NavOutcome {
        let mut state = self.state();
        match state.list.head() {
            Some(head) => {
                state.current = Some(head);
                self.play_entry(&state, head)
            }
            None => NavOutcome::NothingToPlay,
        }
    }

    /// Move to the next track and play it. The structure is circular, so the
    /// step always succeeds once a track is selected; wrapping past the tail
    /// is not a distinct transition.
    pub fn advance_next(&self) -> NavOutcome {
        let mut state = self.state();
        match state.current {
            Some(cur) => {
                let next = state.list.next(cur);
                state.current = Some(next);
                self.play_entry(&state, next)
            }
            None => NavOutcome::NothingToPlay,
        }
    }

    /// Move to the previous track and play it. Single `prev` step: the
    /// historical double-step here was a bug, not a feature.
    pub fn advance_previous(&self) -> NavOutcome {
        let mut state = self.state();
        match state.current {
            Some(cur) => {
                let prev = state.list.prev(cur);
                state.current = Some(prev);
                self.play_entry(&state, prev)
            }
            None => NavOutcome::NothingToPlay,
        }
    }

    /// Reissue the play command for the current track without moving.
    pub fn replay_current(&self) -> NavOutcome {
        let state = self.state();
        match state.current {
            Some(cur) => self.play_entry(&state, cur),
            None => NavOutcome::NothingToPlay,
        }
    }

    /// End-of-stream policy: loop replays the current track, otherwise
    /// advance. The only state transition not initiated by the user.
    pub fn on_track_end(&self) -> NavOutcome {
        if self.loop_enabled() {
            self.replay_current()
        } else {
            self.advance_next()
        }
    }

    /// Flip the loop flag; returns the new value.
    pub fn toggle_loop(&self) -> bool {
        let mut state = self.state();
        state.loop_enabled = !state.loop_enabled;
        state.loop_enabled
    }

    /// Flip the shuffle flag; returns the new value.
    ///
    /// Enabling shuffles the store in place, resets the cursor to the new
    /// head and plays it. Disabling only clears the flag: shuffling is
    /// destructive and no original order is retained.
    pub fn toggle_shuffle(&self) -> bool {
        let mut state = self.state();
        state.shuffle_enabled = !state.shuffle_enabled;

        if state.shuffle_enabled {
            if let Some(head) = state.list.shuffle(&mut rand::rng()) {
                state.current = Some(head);
                self.play_entry(&state, head);
            }
        }
        state.shuffle_enabled
    }
}
