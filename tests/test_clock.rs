use std::time::{Duration, Instant};

use word_invaders::clock::GameClock;

#[test]
fn elapsed_tracks_wall_clock() {
    let t0 = Instant::now();
    let clock = GameClock::start(t0);
    assert_eq!(clock.elapsed_at(t0), Duration::ZERO);
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(5)), Duration::from_secs(5));
}

#[test]
fn paused_time_is_not_counted() {
    let t0 = Instant::now();
    let s = Duration::from_secs;
    let mut clock = GameClock::start(t0);

    clock.pause(t0 + s(5));
    assert!(clock.is_paused());
    assert_eq!(clock.elapsed_at(t0 + s(8)), s(5));

    clock.resume(t0 + s(8));
    assert!(!clock.is_paused());
    assert_eq!(clock.elapsed_at(t0 + s(10)), s(7));
}

#[test]
fn double_pause_keeps_first_mark() {
    let t0 = Instant::now();
    let s = Duration::from_secs;
    let mut clock = GameClock::start(t0);
    clock.pause(t0 + s(2));
    clock.pause(t0 + s(4));
    clock.resume(t0 + s(6));
    clock.resume(t0 + s(9));
    assert_eq!(clock.elapsed_at(t0 + s(10)), s(6));
}
