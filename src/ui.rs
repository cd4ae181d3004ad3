//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::config::{ControlsSettings, UiSettings};
use crate::player::PlaybackInfo;
use crate::playlist::PlaylistView;

/// Everything the renderer needs for one frame.
pub struct UiContext<'a> {
    pub view: &'a PlaylistView,
    pub playback: PlaybackInfo,
    pub status: &'a str,
    pub volume: f32,
    pub url_input: Option<&'a str>,
}

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[enter] play".to_string(),
        "[space/p] pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{}s", seek_seconds),
        "[s] shuffle".to_string(),
        "[r] loop".to_string(),
        "[-/+] volume".to_string(),
        "[d] download url".to_string(),
        "[w/o] save/load playlist".to_string(),
        "[x] stop".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    ctx: &UiContext,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" rondo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        match ctx.view.current {
            Some(idx) => {
                let song = &ctx.view.songs[idx];
                let state = if ctx.playback.playing {
                    "Playing"
                } else {
                    "Paused"
                };
                parts.push(format!(
                    "Song: {} [{}] {}",
                    song,
                    format_mmss(ctx.playback.elapsed),
                    state
                ));
            }
            None => parts.push("Stopped".to_string()),
        }

        parts.push(format!(
            "Loop: {}",
            if ctx.view.loop_enabled { "ON" } else { "OFF" }
        ));
        parts.push(format!(
            "Shuffle: {}",
            if ctx.view.shuffle_enabled { "ON" } else { "OFF" }
        ));
        parts.push(format!("Vol: {:.0}%", ctx.volume * 100.0));
        parts.push(format!("Dir: {}", ctx.view.music_dir.display()));

        if !ctx.status.trim().is_empty() {
            parts.push(ctx.status.trim().to_string());
        }

        parts.join(" | ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Song list; keep the current song centered in the visible window when possible.
    {
        let total = ctx.view.songs.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = ctx.view.current.unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = ctx.view.songs[start..end]
            .iter()
            .map(|s| ListItem::new(s.as_str()))
            .collect();

        let list = List::new(visible_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" playlist ({}) ", total)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if ctx.view.current.is_some() {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay URL prompt (keeps list visible under it)
    if let Some(url) = ctx.url_input {
        let popup_area = centered_rect_sized(72, 3, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let prompt = Paragraph::new(format!("{}_", url)).block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(" download url (enter confirms, esc cancels) "),
        );
        frame.render_widget(prompt, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
