//! Named playlist persistence.
//!
//! A playlist file is plain text, one song identifier per line. Loading
//! replaces the in-memory playlist wholesale; saving truncates and rewrites
//! the file from the current order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::default_data_dir;

/// Directory where named playlists live, under the user data dir.
pub fn playlists_dir() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("playlists"))
}

pub fn playlist_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

/// Read a playlist file into song names, in file order. Blank lines and
/// surrounding whitespace are dropped.
pub fn load(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read playlist {}", path.display()))?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Write `songs` to `path`, one per line, truncating any existing file.
pub fn save(path: &Path, songs: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut out = String::new();
    for song in songs {
        out.push_str(song);
        out.push('\n');
    }

    fs::write(path, out).with_context(|| format!("failed to write playlist {}", path.display()))
}
