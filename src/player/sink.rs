//! Utilities for creating `rodio` sinks from files on disk.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink, Source};

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Open and decode failures are reported to the caller instead of tearing
/// down the player thread; a bad file must not halt the playlist.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("failed to decode {}", path.display()))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
