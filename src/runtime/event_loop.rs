use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::config;
use crate::downloader::{self, DownloadStatus};
use crate::player::{PlaybackInfo, Player, PlayerCmd, PlayerEvent};
use crate::playlist::{NavOutcome, PlaylistService};
use crate::playlists;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// One-line status message shown in the status box.
    pub status: String,
    /// Current volume, mirrored locally so keybinds can step it.
    pub volume: f32,
    /// URL being typed for a download, `Some` while the prompt is open.
    pub url_input: Option<String>,
    /// Playback errors since the last track that ended normally. Once every
    /// song in the playlist has failed in a row, auto-advance stops instead
    /// of spinning through the list forever.
    consecutive_errors: usize,
}

impl EventLoopState {
    pub fn new(volume: f32) -> Self {
        Self {
            status: String::new(),
            volume,
            url_input: None,
            consecutive_errors: 0,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and events from the
/// player and downloader threads. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    service: &Arc<PlaylistService>,
    player: &Player,
    event_rx: &mpsc::Receiver<PlayerEvent>,
    download_tx: &mpsc::Sender<DownloadStatus>,
    download_rx: &mpsc::Receiver<DownloadStatus>,
) -> anyhow::Result<()> {
    let mut state = EventLoopState::new(settings.playback.volume);

    loop {
        while let Ok(ev) = event_rx.try_recv() {
            handle_player_event(ev, service, player, &mut state);
        }

        while let Ok(status) = download_rx.try_recv() {
            state.status = match status {
                DownloadStatus::Started => "Downloading...".to_string(),
                DownloadStatus::Finished(song) => format!("Downloaded: {}", song),
                DownloadStatus::Discarded(song) => {
                    format!("Downloaded {} but the playlist changed", song)
                }
                DownloadStatus::Failed(e) => format!("Download failed: {}", e),
            };
        }

        let view = service.view();
        let playback: PlaybackInfo = player
            .playback_handle()
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default();

        terminal.draw(|f| {
            let ctx = ui::UiContext {
                view: &view,
                playback,
                status: &state.status,
                volume: state.volume,
                url_input: state.url_input.as_deref(),
            };
            ui::draw(f, &ctx, &settings.ui, &settings.controls)
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, service, player, download_tx, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_player_event(
    ev: PlayerEvent,
    service: &Arc<PlaylistService>,
    player: &Player,
    state: &mut EventLoopState,
) {
    match ev {
        PlayerEvent::TrackEnded => {
            state.consecutive_errors = 0;
            service.on_track_end();
        }
        PlayerEvent::PlaybackError(msg) => {
            warn!(error = %msg, "playback error");
            state.status = format!("Playback error: {}", msg);
            state.consecutive_errors += 1;
            if state.consecutive_errors >= service.len().max(1) {
                // Every song failed back to back; stop instead of looping.
                let _ = player.send(PlayerCmd::Stop);
                state.consecutive_errors = 0;
            } else {
                service.advance_next();
            }
        }
    }
}

/// Returns `true` when the loop should exit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    service: &Arc<PlaylistService>,
    player: &Player,
    download_tx: &mpsc::Sender<DownloadStatus>,
    state: &mut EventLoopState,
) -> bool {
    // The URL prompt captures all keys while open.
    if let Some(url) = state.url_input.as_mut() {
        match key.code {
            KeyCode::Esc => {
                state.url_input = None;
            }
            KeyCode::Backspace => {
                url.pop();
            }
            KeyCode::Enter => {
                let url = state.url_input.take().unwrap_or_default();
                let url = url.trim().to_string();
                if !url.is_empty() {
                    info!(url, "download requested");
                    downloader::spawn_download(
                        url,
                        service.music_dir(),
                        settings.download.clone(),
                        service.clone(),
                        download_tx.clone(),
                    );
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                url.push(c);
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Enter => {
            report_nav(service.play_head(), state);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = player.send(PlayerCmd::TogglePause);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            report_nav(service.advance_next(), state);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            report_nav(service.advance_previous(), state);
        }
        KeyCode::Char('L') => {
            let secs = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
            let _ = player.send(PlayerCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
            let _ = player.send(PlayerCmd::SeekBy(-secs));
        }
        KeyCode::Char('s') => {
            let on = service.toggle_shuffle();
            state.status = if on {
                "Shuffle on".to_string()
            } else {
                "Shuffle off".to_string()
            };
        }
        KeyCode::Char('r') => {
            let on = service.toggle_loop();
            state.status = if on {
                "Loop on".to_string()
            } else {
                "Loop off".to_string()
            };
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.volume = (state.volume + settings.controls.volume_step).clamp(0.0, 1.0);
            let _ = player.send(PlayerCmd::SetVolume(state.volume));
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            state.volume = (state.volume - settings.controls.volume_step).clamp(0.0, 1.0);
            let _ = player.send(PlayerCmd::SetVolume(state.volume));
        }
        KeyCode::Char('d') => {
            state.url_input = Some(String::new());
        }
        KeyCode::Char('w') => {
            state.status = match save_default_playlist(service) {
                Ok(len) => format!("Saved playlist ({} songs)", len),
                Err(e) => format!("Save failed: {}", e),
            };
        }
        KeyCode::Char('o') => {
            state.status = match load_default_playlist(service, player) {
                Ok(len) => format!("Loaded playlist ({} songs)", len),
                Err(e) => format!("Load failed: {}", e),
            };
        }
        KeyCode::Char('x') => {
            let _ = player.send(PlayerCmd::Stop);
        }
        _ => {}
    }

    false
}

fn report_nav(outcome: NavOutcome, state: &mut EventLoopState) {
    if outcome == NavOutcome::NothingToPlay {
        state.status = "Playlist is empty".to_string();
    } else {
        state.status.clear();
    }
}

fn save_default_playlist(service: &Arc<PlaylistService>) -> anyhow::Result<usize> {
    let dir = playlists_dir()?;
    let songs = service.songs();
    playlists::save(&playlists::playlist_path(&dir, "default"), &songs)?;
    Ok(songs.len())
}

/// Stop playback first so the old track does not keep playing over a
/// playlist that no longer contains it, then replace wholesale.
fn load_default_playlist(service: &Arc<PlaylistService>, player: &Player) -> anyhow::Result<usize> {
    let dir = playlists_dir()?;
    let songs = playlists::load(&playlists::playlist_path(&dir, "default"))?;
    let _ = player.send(PlayerCmd::Stop);
    let len = songs.len();
    service.replace_with(songs);
    Ok(len)
}

fn playlists_dir() -> anyhow::Result<std::path::PathBuf> {
    playlists::playlists_dir().ok_or_else(|| anyhow::anyhow!("no home directory"))
}
