//! Graceful device restart
//!
//! Issues a privileged delayed restart, then resynchronizes across the
//! shutdown/boot transition: first confirm the shell actually went
//! away, then wait for it to return, then wait for the device's own
//! boot agent. Waiting for shell-down first prevents a stale "still
//! up" probe from passing for a device that has not begun rebooting.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::InstallerResult;
use crate::transport::{Dispatcher, Transports};
use crate::wait::{wait_for_boot_agent, wait_for_shell_down, wait_for_shell_up, PollSpec};

pub fn reboot(
    transports: &Transports,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
    verbose: bool,
) -> InstallerResult<()> {
    let dispatcher = Dispatcher::new(transports, verbose);

    println!("  sending delayed restart");
    let out = dispatcher.privileged("shutdown -r -t 1 now")?;
    if !out.success {
        eprintln!("⚠ restart command was not confirmed - waiting for the device regardless");
    }

    println!("  waiting for the device to go down");
    wait_for_shell_down(&transports.bridge, spec, running)?;

    println!("  waiting for the shell to come back");
    wait_for_shell_up(&transports.bridge, spec, running)?;

    println!("  waiting for the boot agent");
    wait_for_boot_agent(&transports.bridge, spec, running)?;

    Ok(())
}
