//! Rayhunter installer - provisioning pipeline for the diagnostic
//! daemon on locked-down hotspot devices
//!
//! The device is reachable through two unreliable, partially
//! overlapping transports: a USB debug-bridge shell and a serial
//! AT-command channel. The pipeline is strictly linear - resolve
//! transports, force debug mode, escalate privilege, build, deploy,
//! reboot, verify - and every stage is safe to re-run: the device
//! itself is the shared mutable store, and cross-stage facts are
//! re-derived from it rather than passed in memory.

pub mod build;
pub mod config;
pub mod deploy;
pub mod device;
pub mod error;
pub mod escalate;
pub mod reboot;
pub mod transport;
pub mod verify;
pub mod wait;

// Re-exports for convenience
pub use build::{artifact_path, build, RebuildPolicy};
pub use config::Config;
pub use deploy::{deploy, locate_unit};
pub use error::{InstallerError, InstallerResult};
pub use escalate::{escalate, EscalationOutcome};
pub use reboot::reboot;
pub use transport::{
    at_frame, forward_exists, platform_bundle_url, BridgeShell, CommandOutput, Dispatcher,
    SerialChannel, Transports,
};
pub use verify::{verify, VerifyOutcome, VERIFY_BUDGET};
pub use wait::{wait_until, PollSpec};
