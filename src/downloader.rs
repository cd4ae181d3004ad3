//! Song acquisition via an external downloader subprocess.
//!
//! Each request runs on its own thread so the fetch can block for as long as
//! the subprocess needs; the playlist lock is only taken for the final
//! append. Results are reported over a status channel and never surface as
//! structural playlist errors.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::DownloadSettings;
use crate::playlist::PlaylistService;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with an error: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("downloader reported no output file")]
    NoOutputFile,
}

/// Progress of one download, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Started,
    /// The song was downloaded and appended to the playlist.
    Finished(String),
    /// The song was downloaded but the playlist was replaced in the
    /// meantime, so it was not queued.
    Discarded(String),
    Failed(String),
}

/// Fetch `url` into `dir` on a background thread and append the resulting
/// song to the playlist.
///
/// The replacement generation is sampled before the fetch starts; if the
/// playlist is wholesale-replaced while the subprocess runs, the append is
/// dropped (the file stays on disk).
pub fn spawn_download(
    url: String,
    dir: PathBuf,
    settings: DownloadSettings,
    service: Arc<PlaylistService>,
    status_tx: Sender<DownloadStatus>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let generation = service.generation();
        let _ = status_tx.send(DownloadStatus::Started);

        match fetch(&url, &dir, &settings) {
            Ok(song) => {
                if service.append_downloaded(&song, generation) {
                    info!(song, "download complete");
                    let _ = status_tx.send(DownloadStatus::Finished(song));
                } else {
                    let _ = status_tx.send(DownloadStatus::Discarded(song));
                }
            }
            Err(e) => {
                warn!(url, error = %e, "download failed");
                let _ = status_tx.send(DownloadStatus::Failed(e.to_string()));
            }
        }
    })
}

/// Run the downloader subprocess and return the produced song name.
fn fetch(url: &str, dir: &Path, settings: &DownloadSettings) -> Result<String, DownloadError> {
    let template = format!("{}/%(title)s.%(ext)s", dir.display());

    let output = Command::new(&settings.command)
        .arg("-x")
        .arg("--audio-format")
        .arg(&settings.audio_format)
        .arg("-f")
        .arg("bestaudio")
        .arg("--no-warnings")
        .arg("--no-playlist")
        .arg("--print")
        .arg("after_move:filepath")
        .arg("-o")
        .arg(&template)
        .arg(url)
        .output()
        .map_err(|source| DownloadError::Spawn {
            command: settings.command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(DownloadError::Failed {
            command: settings.command.clone(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    song_name_from_output(&stdout).ok_or(DownloadError::NoOutputFile)
}

/// The downloader prints the final file path on stdout (last line wins when
/// it prints several). Reduce it to a bare song name.
fn song_name_from_output(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .and_then(|line| Path::new(line).file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
