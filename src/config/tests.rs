use super::load::{default_config_path, default_data_dir, resolve_config_path, store_music_dir};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_rondo_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", "/tmp/rondo-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/rondo-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("rondo")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_falls_back_to_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_data_dir().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local")
            .join("share")
            .join("rondo")
    );
}

#[test]
fn settings_defaults_are_sane() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert!(s.music.dir.is_none());
    assert!(!s.playback.shuffle);
    assert!(!s.playback.loop_enabled);
    assert!(s.playback.autoplay);
    assert_eq!(s.playback.volume, 1.0);
    assert_eq!(s.download.command, "yt-dlp");
    assert!(!s.library.recursive);
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[music]
dir = "/srv/music"

[playback]
shuffle = true
loop_enabled = true
autoplay = false
volume = 0.5

[download]
command = "yt-dlp-nightly"
audio_format = "opus"

[controls]
seek_seconds = 9
volume_step = 0.1

[library]
extensions = ["mp3"]
recursive = true
include_hidden = true
follow_links = false
max_depth = 3

[ui]
header_text = "hello"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("RONDO__PLAYBACK__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.music.dir.as_deref(),
        Some(std::path::Path::new("/srv/music"))
    );
    assert!(s.playback.shuffle);
    assert!(s.playback.loop_enabled);
    assert!(!s.playback.autoplay);
    assert_eq!(s.playback.volume, 0.5);
    assert_eq!(s.download.command, "yt-dlp-nightly");
    assert_eq!(s.download.audio_format, "opus");
    assert_eq!(s.controls.seek_seconds, 9);
    assert_eq!(s.controls.volume_step, 0.1);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert_eq!(s.ui.header_text, "hello");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 0.8
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("RONDO__PLAYBACK__VOLUME", "0.25");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 0.25);
}

#[test]
fn validate_rejects_out_of_range_volume() {
    let mut s = Settings::default();
    s.playback.volume = 1.5;
    assert!(s.validate().is_err());
}

#[test]
fn store_music_dir_updates_config_file_in_place() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 0.4
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("RONDO__PLAYBACK__VOLUME");

    store_music_dir(std::path::Path::new("/srv/tunes")).unwrap();

    let s = Settings::load().unwrap();
    assert_eq!(
        s.music.dir.as_deref(),
        Some(std::path::Path::new("/srv/tunes"))
    );
    // Keeps the unrelated section intact.
    assert_eq!(s.playback.volume, 0.4);
}
