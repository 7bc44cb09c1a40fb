//! Post-deploy connectivity verification
//!
//! Confirms the deployed service is actually reachable: make sure its
//! process is up (starting it if needed), ensure a local port forward
//! exists without ever duplicating one, then poll the HTTP endpoint
//! within a fixed budget. Never reaching it is reported as a distinct
//! non-fatal outcome - the deployment itself is still complete.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::device;
use crate::error::{InstallerError, InstallerResult};
use crate::transport::{forward_exists, Dispatcher, Transports};
use crate::wait::{wait_until, PollSpec};

/// Hard ceiling for the HTTP poll
pub const VERIFY_BUDGET: Duration = Duration::from_secs(30);

/// Result of the verification stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The service answered over the forwarded port
    Reachable,
    /// The budget elapsed without any HTTP response
    TimedOut,
}

pub fn verify(
    transports: &Transports,
    port: u16,
    running: &Arc<AtomicBool>,
    verbose: bool,
) -> InstallerResult<VerifyOutcome> {
    let dispatcher = Dispatcher::new(transports, verbose);

    // start the service if its process is not showing up
    let probe_cmd = format!("ps | grep {} | grep -v grep", device::DAEMON_PROCESS);
    let daemon_up = transports
        .bridge
        .shell(&probe_cmd)
        .map(|out| out.success && out.stdout.contains(device::DAEMON_PROCESS))
        .unwrap_or(false);
    if !daemon_up {
        println!("  daemon not running - starting it");
        let _ = dispatcher.privileged(&format!(
            "{}/{} start",
            device::INIT_DIR,
            device::DAEMON_UNIT
        ));
    }

    // idempotent forward: check before create, never duplicate
    let list = transports.bridge.forward_list()?;
    if forward_exists(&list, port) {
        if verbose {
            println!("  port forward tcp:{port} already present");
        }
    } else {
        println!("  forwarding tcp:{port} to the device");
        transports.bridge.forward(port, port)?;
    }

    let url = format!("http://localhost:{port}/");
    println!("  polling {url}");
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(2))
        .build();
    let spec = PollSpec::new(Duration::from_secs(1), VERIFY_BUDGET);

    // any HTTP response counts, error statuses included; only
    // transport-level failures mean unreachable
    let probe = || match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::Status(_, _)) => true,
        Err(_) => false,
    };

    match wait_until("daemon HTTP endpoint", &spec, running, probe) {
        Ok(()) => Ok(VerifyOutcome::Reachable),
        Err(InstallerError::WaitTimeout { .. }) => Ok(VerifyOutcome::TimedOut),
        Err(err) => Err(err),
    }
}
