use std::thread;
use std::time::Duration;

use super::types::PositionClock;

#[test]
fn clock_starts_at_offset() {
    let mut clock = PositionClock::default();
    clock.start_at(Duration::from_secs(5));
    let elapsed = clock.elapsed();
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
}

#[test]
fn pause_freezes_elapsed() {
    let mut clock = PositionClock::default();
    clock.start_at(Duration::from_secs(2));
    clock.pause();

    let frozen = clock.elapsed();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(clock.elapsed(), frozen, "paused clock must not advance");
}

#[test]
fn resume_continues_from_frozen_position() {
    let mut clock = PositionClock::default();
    clock.start_at(Duration::ZERO);
    clock.pause();
    let frozen = clock.elapsed();

    clock.resume();
    thread::sleep(Duration::from_millis(30));
    assert!(clock.elapsed() > frozen, "resumed clock must advance again");
}

#[test]
fn reset_zeroes_the_clock() {
    let mut clock = PositionClock::default();
    clock.start_at(Duration::from_secs(42));
    clock.reset();
    assert_eq!(clock.elapsed(), Duration::ZERO);
}
