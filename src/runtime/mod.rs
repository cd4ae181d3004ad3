use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::config;
use crate::downloader::DownloadStatus;
use crate::library::scan;
use crate::player::{Player, PlayerEvent};
use crate::playlist::PlaylistService;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings();
    init_logging();

    let music_dir = resolve_music_dir(&settings);
    if let Err(e) = config::store_music_dir(&music_dir) {
        warn!(error = %e, "could not persist music dir to config");
    }

    let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();
    let (download_tx, download_rx) = mpsc::channel::<DownloadStatus>();

    let player = Player::new(event_tx, settings.playback.volume);
    let service = Arc::new(PlaylistService::new(player.sender(), music_dir.clone()));

    for song in scan(&music_dir, &settings.library) {
        service.append(&song);
    }
    info!(dir = %music_dir.display(), songs = service.len(), "library scanned");

    startup::apply_playback_defaults(&service, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &service,
        &player,
        &event_rx,
        &download_tx,
        &download_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.quit();
    run_result
}

/// Music directory precedence: CLI argument, then config, then the working
/// directory.
fn resolve_music_dir(settings: &config::Settings) -> PathBuf {
    if let Some(arg) = env::args().nth(1) {
        return PathBuf::from(arg);
    }
    if let Some(dir) = &settings.music.dir {
        return dir.clone();
    }
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Log to a file in the data dir; the terminal belongs to the TUI. Filter via
/// `RONDO_LOG`. Failing to set up logging is not fatal.
fn init_logging() {
    let Some(dir) = config::default_data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::File::create(dir.join("rondo.log")) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RONDO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}
