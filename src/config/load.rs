use std::{env, path::Path, path::PathBuf};

use anyhow::{Context, Result};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries an optional config file first and then environment
/// variables (prefix `RONDO__`), falling back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("RONDO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be between 0.0 and 1.0".to_string());
        }
        if self.controls.volume_step <= 0.0 {
            return Err("controls.volume_step must be > 0".to_string());
        }
        if self.library.extensions.is_empty() {
            return Err("library.extensions must not be empty".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `RONDO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("RONDO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/rondo/config.toml`
/// or `~/.config/rondo/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("rondo").join("config.toml"))
}

/// Compute the user data directory (`$XDG_DATA_HOME/rondo` or
/// `~/.local/share/rondo`): home of the log file and saved playlists.
pub fn default_data_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("share"))
    } else {
        None
    };

    data_home.map(|d| d.join("rondo"))
}

/// Persist the chosen music directory into `config.toml`, keeping whatever
/// else the file already contains.
pub fn store_music_dir(dir: &Path) -> Result<()> {
    let path = resolve_config_path().context("no config path available")?;

    let mut root: toml::Table = match std::fs::read_to_string(&path) {
        Ok(text) => text.parse().unwrap_or_default(),
        Err(_) => toml::Table::new(),
    };

    let music = root
        .entry("music")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    if let toml::Value::Table(table) = music {
        table.insert(
            "dir".to_string(),
            toml::Value::String(dir.display().to_string()),
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    std::fs::write(&path, rendered)
        .with_context(|| format!("failed to write {}", path.display()))
}
