//! Circular doubly-linked playlist storage.
//!
//! Entries live in an arena (`Vec`) and link to their neighbors by index, so
//! the cycle carries no ownership and `clear` is a single arena reset. While
//! the list is non-empty, following `next` from any entry visits every entry
//! exactly once before returning to it, and `prev` is the exact inverse of
//! `next`.

use rand::Rng;
use rand::seq::SliceRandom;

/// Stable handle to one playlist entry.
///
/// Ids are arena indices; `Playlist::clear` invalidates every id handed out
/// before it, so cursors must be reset in the same critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(usize);

#[derive(Debug)]
struct Entry {
    song: String,
    next: EntryId,
    prev: EntryId,
}

/// The circular collection of songs.
///
/// `head` marks the traversal start for display and the default first
/// position after a shuffle or reload; it carries no other playback meaning.
#[derive(Debug, Default)]
pub struct Playlist {
    entries: Vec<Entry>,
    head: Option<EntryId>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a song before `head` (after the current tail).
    ///
    /// The first entry links to itself and becomes `head`. The new entry is
    /// pushed with both neighbors already set, so no traversal can observe a
    /// half-linked node.
    pub fn insert_tail(&mut self, song: impl Into<String>) -> EntryId {
        let id = EntryId(self.entries.len());
        match self.head {
            None => {
                self.entries.push(Entry {
                    song: song.into(),
                    next: id,
                    prev: id,
                });
                self.head = Some(id);
            }
            Some(head) => {
                let tail = self.entries[head.0].prev;
                self.entries.push(Entry {
                    song: song.into(),
                    next: head,
                    prev: tail,
                });
                self.entries[tail.0].next = id;
                self.entries[head.0].prev = id;
            }
        }
        id
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn head(&self) -> Option<EntryId> {
        self.head
    }

    pub fn song(&self, id: EntryId) -> &str {
        &self.entries[id.0].song
    }

    pub fn next(&self, id: EntryId) -> EntryId {
        self.entries[id.0].next
    }

    pub fn prev(&self, id: EntryId) -> EntryId {
        self.entries[id.0].prev
    }

    /// Drop every entry. Outstanding `EntryId`s become invalid.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
    }

    /// All songs in `next`-order starting from `head`, without mutating.
    pub fn snapshot_order(&self) -> Vec<String> {
        self.ids_in_order()
            .into_iter()
            .map(|id| self.entries[id.0].song.clone())
            .collect()
    }

    /// Entry ids in `next`-order starting from `head`.
    pub(crate) fn ids_in_order(&self) -> Vec<EntryId> {
        let mut out = Vec::with_capacity(self.entries.len());
        let Some(head) = self.head else {
            return out;
        };
        let mut id = head;
        loop {
            out.push(id);
            id = self.entries[id.0].next;
            if id == head {
                break;
            }
        }
        out
    }

    /// Fisher–Yates shuffle over the circular topology.
    ///
    /// Takes a snapshot array of entry ids, permutes it, then relinks
    /// `next`/`prev` modularly and moves `head` to the first shuffled entry.
    /// Empty and single-entry lists are left untouched. Returns the new head.
    pub fn shuffle(&mut self, rng: &mut impl Rng) -> Option<EntryId> {
        let mut ids = self.ids_in_order();
        if ids.len() < 2 {
            return self.head;
        }

        ids.shuffle(rng);

        let n = ids.len();
        for (i, &id) in ids.iter().enumerate() {
            self.entries[id.0].next = ids[(i + 1) % n];
            self.entries[id.0].prev = ids[(i + n - 1) % n];
        }
        self.head = Some(ids[0]);
        self.head
    }
}
