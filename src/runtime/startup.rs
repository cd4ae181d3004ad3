use std::sync::Arc;

use crate::config;
use crate::playlist::PlaylistService;

/// Apply configured playback defaults once the playlist is populated.
///
/// Enabling shuffle here randomizes the order and starts playback from the
/// new head, matching what the toggle does at runtime. Without shuffle,
/// `autoplay` decides whether the head starts on its own.
pub fn apply_playback_defaults(service: &Arc<PlaylistService>, settings: &config::Settings) {
    if settings.playback.loop_enabled {
        service.toggle_loop();
    }

    if settings.playback.shuffle {
        service.toggle_shuffle();
    } else if settings.playback.autoplay {
        service.play_head();
    }
}
