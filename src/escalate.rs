//! Privilege escalation via the setuid root helper
//!
//! Stages the `rootshell` helper onto the device and activates it
//! through the privileged dispatch path, establishing root command
//! execution independent of the bridge's own privilege level. Every
//! failure here is soft: the pipeline continues with best-effort
//! privileged commands.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::device;
use crate::error::{InstallerError, InstallerResult};
use crate::transport::{Dispatcher, Transports};
use crate::wait::{wait_until, PollSpec};

/// How escalation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Helper installed and answering as root
    Escalated,
    /// Helper staged but the identity check never confirmed uid 0
    Unverified,
    /// No helper binary found locally; nothing staged
    Skipped,
}

/// Local locations the helper binary may live at, first match wins
pub fn helper_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("rootshell/rootshell"),
        PathBuf::from(format!(
            "target/{}/release/rootshell",
            device::BUILD_TARGET
        )),
    ]
}

/// Stage and activate the root helper
pub fn escalate(
    transports: &Transports,
    running: &Arc<AtomicBool>,
    verbose: bool,
) -> InstallerResult<EscalationOutcome> {
    let Some(helper) = helper_candidates().into_iter().find(|p| p.exists()) else {
        eprintln!("⚠ root helper binary not found locally - skipping privilege escalation");
        return Ok(EscalationOutcome::Skipped);
    };

    let staged = format!("{}/rootshell", device::TMP_DIR);
    if let Err(err) = transports.bridge.push(&helper, &staged) {
        eprintln!("⚠ could not stage root helper: {err}");
        return Ok(EscalationOutcome::Skipped);
    }

    let dispatcher = Dispatcher::new(transports, verbose);
    let spec = PollSpec::new(Duration::from_secs(1), Duration::from_secs(10));
    let list_cmd = format!("ls -l {}", device::ROOTSHELL_PATH);

    // each privileged sub-step applies asynchronously on the device;
    // poll the observable effect instead of sleeping a fixed delay
    if let Err(err) = dispatcher.privileged(&format!("cp {staged} {}", device::ROOTSHELL_PATH)) {
        eprintln!("⚠ could not install root helper: {err}");
        return Ok(EscalationOutcome::Unverified);
    }
    soft_wait("root helper copied", &spec, running, || {
        transports.bridge.shell_ok(&list_cmd)
    })?;

    let _ = dispatcher.privileged(&format!("chown root {}", device::ROOTSHELL_PATH));
    let _ = dispatcher.privileged(&format!("chmod 4755 {}", device::ROOTSHELL_PATH));
    soft_wait("setuid bit visible", &spec, running, || {
        transports
            .bridge
            .shell(&list_cmd)
            .map(|out| out.success && out.stdout.starts_with("-rws"))
            .unwrap_or(false)
    })?;

    // the helper must answer as root through the unprivileged shell
    let verified = soft_wait("root identity check", &spec, running, || {
        transports
            .bridge
            .shell(&format!("{} -c id", device::ROOTSHELL_PATH))
            .map(|out| out.stdout.contains("uid=0"))
            .unwrap_or(false)
    })?;

    if verified {
        Ok(EscalationOutcome::Escalated)
    } else {
        eprintln!("⚠ root helper staged but never confirmed uid 0");
        Ok(EscalationOutcome::Unverified)
    }
}

/// A bounded wait whose timeout is tolerated; cancellation still aborts
fn soft_wait<F>(
    label: &str,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
    probe: F,
) -> InstallerResult<bool>
where
    F: FnMut() -> bool,
{
    match wait_until(label, spec, running, probe) {
        Ok(()) => Ok(true),
        Err(InstallerError::WaitTimeout { label, .. }) => {
            eprintln!("⚠ gave up waiting for {label}");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn helper_candidates_prefer_packaged_binary() {
        let candidates = helper_candidates();
        assert_eq!(candidates[0], PathBuf::from("rootshell/rootshell"));
        assert_eq!(
            candidates[1],
            PathBuf::from("target/armv7-unknown-linux-musleabihf/release/rootshell")
        );
    }

    #[test]
    fn soft_wait_tolerates_timeout() {
        let running = Arc::new(AtomicBool::new(true));
        let spec = PollSpec::new(Duration::from_millis(1), Duration::from_millis(5));
        let verified = soft_wait("never", &spec, &running, || false).unwrap();
        assert!(!verified);
    }

    #[test]
    fn soft_wait_propagates_cancellation() {
        let running = Arc::new(AtomicBool::new(true));
        running.store(false, Ordering::SeqCst);
        let spec = PollSpec::new(Duration::from_millis(1), Duration::from_millis(5));
        let result = soft_wait("cancelled", &spec, &running, || false);
        assert!(matches!(result, Err(InstallerError::Cancelled)));
    }
}
