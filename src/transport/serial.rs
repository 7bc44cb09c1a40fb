//! Serial AT-command channel
//!
//! A host-side helper binary that talks to the modem's serial control
//! interface. It can execute system commands on the device before any
//! shell-level root exists, which makes it the bootstrap path for
//! privilege escalation. Entirely optional: when it cannot be resolved
//! the pipeline degrades to the bridge-plus-root-helper path.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{InstallerError, InstallerResult};
use crate::transport::CommandOutput;

/// Resolved serial helper
pub struct SerialChannel {
    bin: PathBuf,
}

/// Wrap a shell command in an AT system-command frame
pub fn at_frame(cmd: &str) -> String {
    format!("AT+SYSCMD={cmd}")
}

impl SerialChannel {
    /// Resolve the helper: prebuilt per-platform binary first, then a
    /// build from local source. Every failure here is soft.
    pub fn resolve(verbose: bool) -> Option<Self> {
        let bin = locate_or_build(verbose)?;

        clear_quarantine(&bin);

        // best-effort self test; the channel stays usable either way
        let ok = Command::new(&bin)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !ok {
            eprintln!("⚠ serial helper self-test failed, continuing anyway");
        } else if verbose {
            println!("  serial: using {}", bin.display());
        }

        Some(Self { bin })
    }

    pub fn path(&self) -> &Path {
        &self.bin
    }

    /// Execute a system command on the device through an AT frame.
    /// Works before the device has any working root shell.
    pub fn syscmd(&self, cmd: &str) -> InstallerResult<CommandOutput> {
        self.run(&at_frame(cmd))
    }

    /// Switch the device into its debug state, enabling the bridge
    pub fn enable_debug_mode(&self) -> InstallerResult<CommandOutput> {
        self.run("--root")
    }

    fn run(&self, arg: &str) -> InstallerResult<CommandOutput> {
        let output = Command::new(&self.bin)
            .arg(arg)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| InstallerError::CommandFailed {
                command: format!("{} {arg}", self.bin.display()),
                message: e.to_string(),
            })?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Candidate prebuilt paths for a host OS
pub fn prebuilt_candidates(os: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("binaries/serial-{os}")),
        PathBuf::from("serial/target/release/serial"),
    ]
}

fn locate_or_build(verbose: bool) -> Option<PathBuf> {
    for candidate in prebuilt_candidates(std::env::consts::OS) {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if !Path::new("serial/Cargo.toml").exists() {
        eprintln!("⚠ no prebuilt serial helper and no serial/ source tree");
        return None;
    }

    let built = PathBuf::from("serial/target/release/serial");

    // native build first, cross as a fallback
    if which::which("cargo").is_ok() && build_with(verbose, "cargo") && built.exists() {
        return Some(built);
    }
    if which::which("cross").is_ok() && build_with(verbose, "cross") && built.exists() {
        return Some(built);
    }

    eprintln!("⚠ building the serial helper from source failed");
    None
}

fn build_with(verbose: bool, tool: &str) -> bool {
    if verbose {
        println!("  serial: building helper with {tool}");
    }
    let mut cmd = Command::new(tool);
    cmd.args(["build", "--release", "--manifest-path", "serial/Cargo.toml"]);
    if verbose {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
    cmd.status().map(|s| s.success()).unwrap_or(false)
}

/// Strip the macOS download-quarantine marker so the helper can run.
/// A failure only means the marker was never there.
fn clear_quarantine(bin: &Path) {
    if std::env::consts::OS != "macos" {
        return;
    }
    let _ = Command::new("xattr")
        .args(["-d", "com.apple.quarantine"])
        .arg(bin)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_frame_wraps_command_verbatim() {
        assert_eq!(at_frame("mkdir -p /data/rayhunter"), "AT+SYSCMD=mkdir -p /data/rayhunter");
    }

    #[test]
    fn at_frame_preserves_special_characters() {
        assert_eq!(
            at_frame("shutdown -r -t 1 now"),
            "AT+SYSCMD=shutdown -r -t 1 now"
        );
    }

    #[test]
    fn prebuilt_candidates_are_platform_specific() {
        let linux = prebuilt_candidates("linux");
        assert_eq!(linux[0], PathBuf::from("binaries/serial-linux"));
        let macos = prebuilt_candidates("macos");
        assert_eq!(macos[0], PathBuf::from("binaries/serial-macos"));
        // source-build output is always the last resort
        assert_eq!(
            linux.last().unwrap(),
            &PathBuf::from("serial/target/release/serial")
        );
    }
}
