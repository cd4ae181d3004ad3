//! Playlist engine: the circular store, its shuffle and the navigation cursor.
//!
//! `store` holds the circular doubly-linked list of songs, `service` wraps it
//! together with the cursor and mode flags behind a single lock.

mod service;
mod store;

pub use service::{NavOutcome, PlaylistService, PlaylistView};
pub use store::{EntryId, Playlist};
