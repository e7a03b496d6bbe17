/*!
 * Process-wide Guard Tests
 * Free functions backed by the lazily configured global guard
 */

mod common;

use common::capability;
use serial_test::serial;
use std::thread;
use std::time::Duration;
use timeout_guard::{
    enforce, registry, run, run_optional, try_run, try_run_optional, Deadline, TimeoutGuard,
};

#[test]
#[serial]
fn test_free_functions_share_global_guard() {
    let before = TimeoutGuard::global().stats().started;

    assert_eq!(run(&capability(), "a", 1.0, || 1).unwrap(), Some(1));
    assert_eq!(try_run(&capability(), "b", 1.0, || Ok::<_, String>(2)).unwrap(), Some(2));
    assert_eq!(enforce(&capability(), "c", 1.0, || Ok::<_, String>(3)).unwrap(), 3);

    assert_eq!(TimeoutGuard::global().stats().started, before + 3);
    assert!(!registry::is_active());
}

#[test]
#[serial]
fn test_global_run_times_out() {
    let result = run(&capability(), "global", 0.05, || {
        thread::sleep(Duration::from_millis(500));
    });
    assert_eq!(result.unwrap(), None);
    assert!(!TimeoutGuard::global().backend().is_armed());
}

#[test]
#[serial]
fn test_global_optional_variants() {
    assert_eq!(run_optional(None, || 7).unwrap(), Some(7));

    let deadline = Deadline::new(capability(), 1.0).named("opt");
    assert_eq!(
        try_run_optional(Some(&deadline), || Ok::<_, String>("x")).unwrap(),
        Some("x")
    );
}
