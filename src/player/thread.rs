use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::warn;

use super::sink::create_sink_at;
use super::types::{PlaybackHandle, PlayerCmd, PlayerEvent, PositionClock};

pub(super) fn spawn_player_thread(
    rx: Receiver<PlayerCmd>,
    events: Sender<PlayerEvent>,
    playback_info: PlaybackHandle,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        // The file currently loaded into the sink, kept so pause/resume and
        // seeking can rebuild the sink at an offset.
        let mut current: Option<(PathBuf, Sink)> = None;
        let mut paused = true;
        let mut volume = initial_volume.clamp(0.0, 1.0);
        let mut clock = PositionClock::default();

        fn do_stop(
            current: &mut Option<(PathBuf, Sink)>,
            paused: &mut bool,
            clock: &mut PositionClock,
            playback_info: &PlaybackHandle,
        ) {
            if let Some((_, sink)) = current.as_ref() {
                sink.stop();
            }
            *current = None;
            *paused = true;
            clock.reset();
            if let Ok(mut info) = playback_info.lock() {
                info.elapsed = Duration::ZERO;
                info.playing = false;
            }
        }

        // Load `path` at `offset` and start playing it, reporting failures as
        // events rather than tearing the thread down.
        fn do_play_at(
            path: PathBuf,
            offset: Duration,
            stream: &rodio::OutputStream,
            current: &mut Option<(PathBuf, Sink)>,
            paused: &mut bool,
            volume: f32,
            clock: &mut PositionClock,
            playback_info: &PlaybackHandle,
            events: &Sender<PlayerEvent>,
        ) {
            if let Some((_, old_sink)) = current.as_ref() {
                old_sink.stop();
            }

            match create_sink_at(stream, &path, offset) {
                Ok(sink) => {
                    sink.set_volume(volume);
                    sink.play();
                    *current = Some((path, sink));
                    *paused = false;
                    clock.start_at(offset);
                    if let Ok(mut info) = playback_info.lock() {
                        info.elapsed = offset;
                        info.playing = true;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot play file");
                    *current = None;
                    *paused = true;
                    clock.reset();
                    if let Ok(mut info) = playback_info.lock() {
                        info.elapsed = Duration::ZERO;
                        info.playing = false;
                    }
                    let _ = events.send(PlayerEvent::PlaybackError(format!("{e:#}")));
                }
            }
        }

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => match cmd {
                    PlayerCmd::Play(path) => {
                        do_play_at(
                            path,
                            Duration::ZERO,
                            &stream,
                            &mut current,
                            &mut paused,
                            volume,
                            &mut clock,
                            &playback_info,
                            &events,
                        );
                    }

                    PlayerCmd::Stop => {
                        do_stop(&mut current, &mut paused, &mut clock, &playback_info);
                    }

                    PlayerCmd::TogglePause => {
                        if paused {
                            // Resume by rebuilding the sink at the recorded offset,
                            // mirroring a seek back to where we paused.
                            if let Some((path, _)) = current.take() {
                                let offset = clock.elapsed();
                                do_play_at(
                                    path,
                                    offset,
                                    &stream,
                                    &mut current,
                                    &mut paused,
                                    volume,
                                    &mut clock,
                                    &playback_info,
                                    &events,
                                );
                            }
                        } else if let Some((_, sink)) = current.as_ref() {
                            sink.pause();
                            clock.pause();
                            paused = true;
                            if let Ok(mut info) = playback_info.lock() {
                                info.playing = false;
                            }
                        }
                    }

                    PlayerCmd::SetVolume(v) => {
                        volume = v.clamp(0.0, 1.0);
                        if let Some((_, sink)) = current.as_ref() {
                            sink.set_volume(volume);
                        }
                    }

                    PlayerCmd::SeekBy(secs) => {
                        // Scrubbing: rebuild the current sink and skip into the file.
                        let Some((path, sink)) = current.take() else {
                            continue;
                        };
                        sink.stop();

                        let cur = clock.elapsed().as_secs() as i64;
                        let target = Duration::from_secs((cur + secs).max(0) as u64);
                        let was_paused = paused;

                        do_play_at(
                            path,
                            target,
                            &stream,
                            &mut current,
                            &mut paused,
                            volume,
                            &mut clock,
                            &playback_info,
                            &events,
                        );

                        if was_paused {
                            if let Some((_, sink)) = current.as_ref() {
                                sink.pause();
                                clock.pause();
                                paused = true;
                                if let Ok(mut info) = playback_info.lock() {
                                    info.playing = false;
                                }
                            }
                        }
                    }

                    PlayerCmd::Quit => {
                        do_stop(&mut current, &mut paused, &mut clock, &playback_info);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Refresh shared elapsed time and check for end of stream.
                    if let Ok(mut info) = playback_info.lock() {
                        if info.playing {
                            info.elapsed = clock.elapsed();
                        }
                    }

                    if let Some((_, sink)) = current.as_ref() {
                        if !paused && sink.empty() {
                            current = None;
                            paused = true;
                            clock.reset();
                            if let Ok(mut info) = playback_info.lock() {
                                info.elapsed = Duration::ZERO;
                                info.playing = false;
                            }
                            // Policy (loop vs advance) lives with the cursor,
                            // not here.
                            let _ = events.send(PlayerEvent::TrackEnded);
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
