//! Privileged command dispatch
//!
//! Fallback order for commands that need root:
//!
//! 1. the serial AT channel, which works before the device has any
//!    shell-level root and is therefore the bootstrap path;
//! 2. the bridge shell piped through the installed root helper. If the
//!    helper is not installed yet this is a no-op; the failure is
//!    reported and swallowed, and downstream callers must tolerate it.
//!
//! The dispatcher itself never aborts the pipeline - callers decide
//! fatality from the returned output.

use crate::device;
use crate::error::InstallerResult;
use crate::transport::{CommandOutput, Transports};

/// Issues commands against the device through the best available transport
pub struct Dispatcher<'a> {
    transports: &'a Transports,
    verbose: bool,
}

/// Wrap a command in a root-helper invocation for the bridge shell
pub fn rootshell_invocation(cmd: &str) -> String {
    format!("{} -c '{cmd}'", device::ROOTSHELL_PATH)
}

impl<'a> Dispatcher<'a> {
    pub fn new(transports: &'a Transports, verbose: bool) -> Self {
        Self { transports, verbose }
    }

    /// Plain shell command over the bridge
    pub fn shell(&self, cmd: &str) -> InstallerResult<CommandOutput> {
        if self.verbose {
            println!("  shell: {cmd}");
        }
        self.transports.bridge.shell(cmd)
    }

    /// System command as root, via serial when present
    pub fn privileged(&self, cmd: &str) -> InstallerResult<CommandOutput> {
        if let Some(serial) = &self.transports.serial {
            if self.verbose {
                println!("  syscmd (serial): {cmd}");
            }
            match serial.syscmd(cmd) {
                Ok(out) => return Ok(out),
                Err(err) => {
                    eprintln!("⚠ serial channel error ({err}), falling back to the bridge");
                }
            }
        }

        let wrapped = rootshell_invocation(cmd);
        if self.verbose {
            println!("  syscmd (bridge): {wrapped}");
        }
        let out = self.transports.bridge.shell(&wrapped)?;
        if !out.success {
            eprintln!("⚠ privileged command '{cmd}' had no effect - root helper may not be installed yet");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rootshell_invocation_wraps_command() {
        assert_eq!(
            rootshell_invocation("chmod 4755 /bin/rootshell"),
            "/bin/rootshell -c 'chmod 4755 /bin/rootshell'"
        );
    }
}
