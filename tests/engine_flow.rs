use std::sync::mpsc;
use std::time::Duration;

// Headless integration using the internal runtime + Engine without a TTY.
// Verifies that complete flashcard rounds run via Runner/TestEventSource.

use flipfox::engine::Engine;
use flipfox::persist::MemoryKvStore;
use flipfox::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use flipfox::settings::SettingsUpdate;

fn ticking_runner() -> Runner<TestEventSource, FixedTicker> {
    let (_tx, rx): (mpsc::Sender<AppEvent>, _) = mpsc::channel();
    // keep the sender alive long enough to build the source, then drop it:
    // a disconnected channel makes every step a Tick immediately
    let es = TestEventSource::new(rx);
    Runner::new(es, FixedTicker::new(Duration::from_millis(1)))
}

#[test]
fn headless_round_completes_via_hold_expiry() {
    let mut engine = Engine::new(Box::new(MemoryKvStore::new())).with_hold_ms(100);
    engine.configure(SettingsUpdate {
        delay_sec: Some(0.0),
        count: Some(3),
        ..Default::default()
    });
    engine.start_new_game();

    let runner = ticking_runner();

    for _ in 0..3 {
        engine.mark(true);
        for _ in 0..100u32 {
            if !engine.session().unwrap().holding {
                break;
            }
            if let AppEvent::Tick = runner.step() {
                engine.on_tick();
            }
        }
    }

    let session = engine.session().unwrap();
    assert!(session.finished, "round should finish after the last hold");
    assert_eq!(session.seen, 3);
    assert_eq!(session.correct, 3);
    assert_eq!(engine.stats().total_games, 1);
    assert_eq!(engine.stats().total_seen, 3);
}

#[test]
fn headless_timed_reveal_shows_answer() {
    let mut engine = Engine::new(Box::new(MemoryKvStore::new()));
    engine.configure(SettingsUpdate {
        delay_sec: Some(0.2),
        ..Default::default()
    });
    engine.start_new_game();
    assert!(!engine.session().unwrap().showing_answer);

    let runner = ticking_runner();

    for _ in 0..100u32 {
        if engine.session().unwrap().showing_answer {
            break;
        }
        if let AppEvent::Tick = runner.step() {
            engine.on_tick();
        }
    }

    let session = engine.session().unwrap();
    assert!(session.showing_answer, "reveal countdown should complete");
    assert_eq!(session.reveal_pct, 100.0);
    assert!(!session.finished);
    assert_eq!(session.seen, 0, "auto-reveal grades nothing");
}

#[test]
fn headless_pause_freezes_reveal_progress() {
    let mut engine = Engine::new(Box::new(MemoryKvStore::new()));
    engine.configure(SettingsUpdate {
        delay_sec: Some(1.0),
        ..Default::default()
    });
    engine.start_new_game();

    engine.on_tick();
    engine.on_tick();
    let before = engine.session().unwrap().reveal_pct;
    assert!(before > 0.0);

    engine.toggle_pause();
    for _ in 0..50 {
        engine.on_tick();
    }
    assert_eq!(engine.session().unwrap().reveal_pct, before);
    assert!(!engine.session().unwrap().showing_answer);

    // resume and rearm, the countdown restarts from zero
    engine.toggle_pause();
    engine.start_timer();
    assert_eq!(engine.session().unwrap().reveal_pct, 0.0);
    for _ in 0..30 {
        engine.on_tick();
    }
    assert!(engine.session().unwrap().showing_answer);
}

#[test]
fn headless_early_continue_matches_hold_expiry() {
    let mut quick = Engine::new(Box::new(MemoryKvStore::new())).with_hold_ms(100);
    quick.configure(SettingsUpdate {
        delay_sec: Some(0.0),
        count: Some(2),
        ..Default::default()
    });
    quick.start_new_game();

    quick.mark(false);
    quick.continue_now();
    quick.mark(true);
    quick.continue_now();

    let session = quick.session().unwrap();
    assert!(session.finished);
    assert_eq!(session.seen, 2);
    assert_eq!(session.correct, 1);
    assert_eq!(session.accuracy, 50);
    assert_eq!(quick.stats().total_games, 1);
}
