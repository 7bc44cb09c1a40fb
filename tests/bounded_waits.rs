//! Bounded-wait behavior of the polling primitive

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayhunter_installer::{wait_until, InstallerError, PollSpec};

fn token() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(true))
}

#[test]
fn immediate_success_does_not_sleep() {
    let spec = PollSpec::new(Duration::from_secs(1), Duration::from_secs(10));
    let start = Instant::now();
    wait_until("ready", &spec, &token(), || true).unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn ceiling_elapses_into_a_timeout_error() {
    let spec = PollSpec::new(Duration::from_millis(1), Duration::from_millis(30));
    let err = wait_until("stuck device", &spec, &token(), || false).unwrap_err();
    match err {
        InstallerError::WaitTimeout { label, .. } => assert_eq!(label, "stuck device"),
        other => panic!("expected WaitTimeout, got {other:?}"),
    }
}

#[test]
fn tripped_token_cancels_before_probing_again() {
    let running = token();
    running.store(false, Ordering::SeqCst);
    let spec = PollSpec::unbounded(Duration::from_millis(1));
    let err = wait_until("anything", &spec, &running, || true).unwrap_err();
    assert!(matches!(err, InstallerError::Cancelled));
}

#[test]
fn condition_becoming_true_ends_the_wait() {
    let spec = PollSpec::new(Duration::from_millis(1), Duration::from_secs(10));
    let mut probes = 0;
    wait_until("eventually", &spec, &token(), move || {
        probes += 1;
        probes > 4
    })
    .unwrap();
}
