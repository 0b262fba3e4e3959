//! Integration tests for the session controller against the CSV log.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use breathroom_core::{
    BreathPattern, CsvSessionLog, Event, ManualClock, SaveOutcome, SessionController,
    SessionStore, SilentNotifier,
};

fn pattern(s: &str) -> BreathPattern {
    s.parse().unwrap()
}

#[test]
fn test_sixteen_second_box_session_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let log = CsvSessionLog::new(dir.path().join("breathing_log.csv"));
    let clock = Arc::new(ManualClock::new());
    let ctl = SessionController::new(log, clock, Arc::new(SilentNotifier));

    let run = ctl.start_practice(pattern("4-4-4-4"), false).unwrap();
    run.run(|event| {
        if let Event::Tick(tick) = event {
            if tick.elapsed_secs == 16 {
                ctl.stop_and_save();
            }
        }
    })
    .unwrap();

    let records = ctl.store().load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pattern, "4-4-4-4");
    assert_eq!(records[0].cycles, 1);
    assert_eq!(records[0].total_seconds, 16);
}

#[test]
fn test_appended_record_is_last_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breathing_log.csv");
    let clock = Arc::new(ManualClock::new());
    let ctl = SessionController::new(CsvSessionLog::new(&path), clock.clone(), Arc::new(SilentNotifier));

    for (p, secs) in [("4-4-4-4", 20), ("4-7-8-0", 38)] {
        let _run = ctl.start_practice(pattern(p), false).unwrap();
        clock.advance(Duration::from_secs(secs));
        assert!(ctl.stop_and_save().is_saved());
    }

    // A fresh handle on the same file sees the same rows in the same order.
    let reopened = CsvSessionLog::new(&path);
    let records = reopened.load_all().unwrap();
    assert_eq!(records.len(), 2);
    let last = records.last().unwrap();
    assert_eq!(last.pattern, "4-7-8-0");
    assert_eq!(last.cycles, 0);
    assert_eq!(last.total_seconds, 38);
    assert_eq!(reopened.recent(1).unwrap()[0], *last);
}

#[test]
fn test_fresh_store_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = CsvSessionLog::new(dir.path().join("never-written.csv"));
    assert!(log.load_all().unwrap().is_empty());
    assert_eq!(log.summary().unwrap().total_sessions, 0);
}

#[test]
fn test_unwritable_log_fails_save_but_goes_idle() {
    let dir = tempfile::tempdir().unwrap();
    // The log path is a directory, so opening it for append fails.
    let log = CsvSessionLog::new(dir.path());
    let ctl = SessionController::new(log, Arc::new(ManualClock::new()), Arc::new(SilentNotifier));

    let _run = ctl.start_practice(pattern("4-4-4-4"), false).unwrap();
    let outcome = ctl.stop_and_save();
    assert!(matches!(outcome, SaveOutcome::Failed { .. }));
    assert!(!ctl.is_running());
    assert!(ctl.start_practice(pattern("1-0-1-0"), false).is_ok());
}

#[test]
fn test_stop_from_another_thread_halts_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let log = CsvSessionLog::new(dir.path().join("breathing_log.csv"));
    let ctl = Arc::new(
        SessionController::with_system_clock(log, Arc::new(SilentNotifier))
            .with_tick_interval(Duration::from_millis(5)),
    );

    let ticks = Arc::new(Mutex::new(0usize));
    let run = ctl.start_practice(pattern("1-0-1-0"), false).unwrap();
    let worker_ticks = ticks.clone();
    let worker = thread::spawn(move || {
        run.run(|event| {
            if event.as_tick().is_some() {
                *worker_ticks.lock().unwrap() += 1;
            }
        })
    });

    thread::sleep(Duration::from_millis(60));
    let outcome = ctl.stop_and_save();
    let stats = worker.join().unwrap().unwrap();
    let ticks_at_join = *ticks.lock().unwrap();

    let record = outcome.record().unwrap().clone();
    assert!(outcome.is_saved());
    assert!(ticks_at_join > 0);
    // Every cycle counted by the timer made it into the record.
    assert_eq!(record.cycles, stats.cycles_completed);
    // Two ticks per cycle for 1-0-1-0, plus at most one partial cycle.
    assert!(ticks_at_join as u32 <= record.cycles * 2 + 2);

    // A duplicate stop after the worker finished writes nothing new.
    assert!(matches!(ctl.stop_and_save(), SaveOutcome::NotRunning));
    assert_eq!(ctl.store().load_all().unwrap().len(), 1);
}

#[test]
fn test_no_tick_after_stop_and_save_returns() {
    let dir = tempfile::tempdir().unwrap();
    let log = CsvSessionLog::new(dir.path().join("breathing_log.csv"));
    let ctl = Arc::new(
        SessionController::with_system_clock(log, Arc::new(SilentNotifier))
            .with_tick_interval(Duration::from_millis(200)),
    );

    let ticks = Arc::new(Mutex::new(0usize));
    let run = ctl.start_practice(pattern("4-4-4-4"), false).unwrap();
    let worker_ticks = ticks.clone();
    let worker = thread::spawn(move || {
        run.run(|event| {
            if event.as_tick().is_some() {
                *worker_ticks.lock().unwrap() += 1;
            }
        })
    });

    // Lands inside the sleep that follows the second tick.
    thread::sleep(Duration::from_millis(300));
    assert!(ctl.stop_and_save().is_saved());
    let ticks_at_stop = *ticks.lock().unwrap();

    let stats = worker.join().unwrap().unwrap();
    assert!(ticks_at_stop > 0);
    assert_eq!(*ticks.lock().unwrap(), ticks_at_stop);
    assert_eq!(stats.cycles_completed, 0);
}
