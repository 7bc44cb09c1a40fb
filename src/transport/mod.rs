//! Device transports
//!
//! Two partially-overlapping paths reach the device: the USB debug
//! bridge (`adb`) and a serial AT-command channel. Either may be
//! missing; the bridge is near-mandatory, the serial channel degrades
//! gracefully. Both are resolved exactly once at pipeline start and
//! the resulting session object is passed by reference everywhere -
//! nothing is re-resolved mid-run.

mod bridge;
mod dispatch;
mod serial;

pub use bridge::{forward_exists, platform_bundle_url, BridgeShell};
pub use dispatch::{rootshell_invocation, Dispatcher};
pub use serial::{at_frame, SerialChannel};

use crate::error::InstallerResult;

/// Captured result of a command issued through a transport
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Resolved transport session, built once per run
pub struct Transports {
    pub bridge: BridgeShell,
    pub serial: Option<SerialChannel>,
}

impl Transports {
    /// Resolve both transports. The bridge is required; a missing
    /// serial channel is reported and tolerated.
    pub fn resolve(verbose: bool) -> InstallerResult<Self> {
        let bridge = BridgeShell::resolve(verbose)?;
        let serial = SerialChannel::resolve(verbose);
        if serial.is_none() {
            eprintln!("⚠ serial channel unavailable - privileged commands will go through the bridge root helper");
        }
        Ok(Self { bridge, serial })
    }
}
