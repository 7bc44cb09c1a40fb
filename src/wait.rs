//! Bounded polling primitives for device synchronization
//!
//! The device exposes no push notifications; every state transition is
//! recovered by polling. Transient command failures are never retried
//! directly - callers wait for the *state* the command was meant to
//! produce instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::device;
use crate::error::{InstallerError, InstallerResult};
use crate::transport::BridgeShell;

/// How often to probe and for how long before giving up
#[derive(Debug, Clone)]
pub struct PollSpec {
    pub interval: Duration,
    /// `None` waits forever (attended runs only)
    pub timeout: Option<Duration>,
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout: Some(timeout),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    /// Device bring-up polling: 1s probes under the operator-chosen
    /// ceiling; `0` seconds means wait forever.
    pub fn boot(timeout_secs: u64) -> Self {
        let interval = Duration::from_secs(1);
        if timeout_secs == 0 {
            Self::unbounded(interval)
        } else {
            Self::new(interval, Duration::from_secs(timeout_secs))
        }
    }
}

/// Poll `probe` until it returns true, the spec's ceiling elapses, or
/// the cancellation token trips.
pub fn wait_until<F>(
    label: &str,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
    mut probe: F,
) -> InstallerResult<()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(InstallerError::Cancelled);
        }
        if probe() {
            return Ok(());
        }
        if let Some(timeout) = spec.timeout {
            if start.elapsed() >= timeout {
                return Err(InstallerError::WaitTimeout {
                    label: label.to_string(),
                    secs: timeout.as_secs(),
                });
            }
        }
        thread::sleep(spec.interval);
    }
}

/// Block until the bridge shell answers a trivial probe
pub fn wait_for_shell_up(
    bridge: &BridgeShell,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
) -> InstallerResult<()> {
    wait_until("device shell", spec, running, || bridge.shell_ok("true"))
}

/// Block until the bridge shell stops answering.
///
/// Used during reboot to confirm shutdown actually began; returning
/// while the old session still responds would race a stale "still up"
/// probe against a device that has not started rebooting yet.
pub fn wait_for_shell_down(
    bridge: &BridgeShell,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
) -> InstallerResult<()> {
    wait_until("device shutdown", spec, running, || {
        !bridge.shell_ok("true")
    })
}

/// Block until `process` shows up in the device process list
pub fn wait_for_agent(
    bridge: &BridgeShell,
    process: &str,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
) -> InstallerResult<()> {
    let probe_cmd = format!("ps | grep {process} | grep -v grep");
    wait_until(&format!("{process} process"), spec, running, || {
        bridge
            .shell(&probe_cmd)
            .map(|out| out.success && out.stdout.contains(process))
            .unwrap_or(false)
    })
}

/// Convenience wrapper for the boot-complete condition
pub fn wait_for_boot_agent(
    bridge: &BridgeShell,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
) -> InstallerResult<()> {
    wait_for_agent(bridge, device::AGENT_PROCESS, spec, running)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    #[test]
    fn succeeds_immediately_on_first_probe() {
        let spec = PollSpec::new(Duration::from_millis(10), Duration::from_millis(100));
        let result = wait_until("test", &spec, &token(), || true);
        assert!(result.is_ok());
    }

    #[test]
    fn times_out_with_never_true_probe() {
        let spec = PollSpec::new(Duration::from_millis(1), Duration::from_millis(20));
        let result = wait_until("never", &spec, &token(), || false);
        match result {
            Err(InstallerError::WaitTimeout { label, .. }) => assert_eq!(label, "never"),
            other => panic!("expected WaitTimeout, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_token_stops_the_wait() {
        let running = token();
        running.store(false, Ordering::SeqCst);
        let spec = PollSpec::unbounded(Duration::from_millis(1));
        let result = wait_until("cancelled", &spec, &running, || false);
        assert!(matches!(result, Err(InstallerError::Cancelled)));
    }

    #[test]
    fn cancellation_wins_mid_poll() {
        let running = token();
        let flag = running.clone();
        let spec = PollSpec::unbounded(Duration::from_millis(1));
        let mut polls = 0;
        let result = wait_until("mid", &spec, &running, move || {
            polls += 1;
            if polls == 3 {
                flag.store(false, Ordering::SeqCst);
            }
            false
        });
        assert!(matches!(result, Err(InstallerError::Cancelled)));
    }

    #[test]
    fn succeeds_after_a_few_probes() {
        let spec = PollSpec::new(Duration::from_millis(1), Duration::from_secs(5));
        let mut polls = 0;
        let result = wait_until("third try", &spec, &token(), move || {
            polls += 1;
            polls >= 3
        });
        assert!(result.is_ok());
    }

    #[test]
    fn boot_spec_zero_means_unbounded() {
        assert!(PollSpec::boot(0).timeout.is_none());
        assert_eq!(PollSpec::boot(300).timeout, Some(Duration::from_secs(300)));
    }
}
