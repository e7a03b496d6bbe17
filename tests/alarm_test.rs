/*!
 * SIGALRM Backend Tests
 * Guarded calls driven by the process interval timer
 */

#![cfg(unix)]

mod common;

use common::{capability, with_captured_logs};
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};
use timeout_guard::{
    registry, AlarmTimer, BackendKind, GuardConfig, TimeoutGuard, TimerBackend,
};

fn alarm_guard() -> TimeoutGuard {
    TimeoutGuard::new(GuardConfig::new().with_backend(BackendKind::Alarm))
}

#[test]
#[serial]
fn test_alarm_guard_completes() {
    let guard = alarm_guard();
    assert_eq!(guard.backend().name(), "alarm");
    assert_eq!(guard.run(&capability(), "fast", 1.0, || 42).unwrap(), Some(42));
    assert!(!guard.backend().is_armed());
    assert!(!registry::is_active());
}

#[test]
#[serial]
fn test_alarm_guard_preempts_blocking_computation() {
    let guard = alarm_guard();
    let start = Instant::now();

    let (result, logs) = with_captured_logs(|| {
        guard.run(&capability(), "slow", 0.1, || {
            thread::sleep(Duration::from_secs(1));
            1
        })
    });

    assert_eq!(result.unwrap(), None);
    assert!(start.elapsed() >= Duration::from_millis(95));
    assert!(start.elapsed() < Duration::from_millis(900));

    let warnings = logs.lines_at("WARN");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Timeout: slow:0.1"));
    assert!(!guard.backend().is_armed());
    assert!(!registry::is_active());
}

#[test]
#[serial]
fn test_alarm_guard_survives_back_to_back_timeouts() {
    let guard = alarm_guard();
    for _ in 0..3 {
        let result = guard.run(&capability(), "again", 0.02, || {
            thread::sleep(Duration::from_millis(200));
        });
        assert_eq!(result.unwrap(), None);
    }

    // A short call after the timeouts must not see a leftover expiry
    assert_eq!(guard.run(&capability(), "clean", 1.0, || "ok").unwrap(), Some("ok"));
    assert_eq!(guard.stats().timed_out, 3);
    assert_eq!(guard.stats().completed, 1);
}

#[test]
#[serial]
fn test_disarmed_alarm_does_not_kill_process() {
    let timer = AlarmTimer::new();
    let guard = alarm_guard();

    let result = guard.run(&capability(), "brief", 0.05, || thread::sleep(Duration::from_millis(5)));
    assert_eq!(result.unwrap(), Some(()));
    thread::sleep(Duration::from_millis(100));

    // Still alive, and the shared slot is empty
    assert!(!timer.is_armed());
}
