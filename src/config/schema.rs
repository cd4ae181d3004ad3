use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/rondo/config.toml` or `~/.config/rondo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RONDO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub music: MusicSettings,
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub download: DownloadSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    /// The music directory. Falls back to the first CLI argument, then the
    /// current directory. Persisted back to the config file once chosen.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether to shuffle the playlist at startup.
    pub shuffle: bool,
    /// Whether the current track loops when it ends.
    pub loop_enabled: bool,
    /// Whether to start playing the first track on launch.
    pub autoplay: bool,
    /// Initial output volume, 0.0–1.0.
    pub volume: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            loop_enabled: false,
            autoplay: true,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Downloader executable invoked as a subprocess.
    pub command: String,
    /// Audio format requested from the downloader.
    pub audio_format: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            command: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ rondo ~ ".to_string(),
        }
    }
}
