//! Daemon build orchestration
//!
//! Produces the cross-compiled daemon artifact, preferring a
//! containerized build when a container engine is installed and
//! actually running, falling back to the native cross toolchain. The
//! build tool itself is a black box: its errors propagate as fatal and
//! its success is judged solely by the artifact appearing at the
//! expected path.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use dialoguer::Confirm;
use is_terminal::IsTerminal;

use crate::device;
use crate::error::{InstallerError, InstallerResult};

/// Container image used for containerized builds
const BUILD_IMAGE: &str = "rayhunter-build";

/// Cross linker whose absence is only a warning - the build tool may
/// still link through its own toolchain
const CROSS_LINKER: &str = "arm-linux-gnueabihf-gcc";

/// What to do when an artifact already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildPolicy {
    /// Ask on a terminal; headless runs keep the existing artifact
    Prompt,
    /// Rebuild unconditionally
    Always,
    /// Keep whatever exists
    Never,
}

impl RebuildPolicy {
    pub fn should_rebuild(&self, artifact: &Path) -> bool {
        match self {
            RebuildPolicy::Always => true,
            RebuildPolicy::Never => false,
            RebuildPolicy::Prompt => {
                if !io::stdout().is_terminal() {
                    return false;
                }
                Confirm::new()
                    .with_prompt(format!(
                        "{} already exists - rebuild it?",
                        artifact.display()
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            }
        }
    }
}

/// Expected artifact location under a repository root
pub fn artifact_path(root: &Path) -> PathBuf {
    root.join("target")
        .join(device::BUILD_TARGET)
        .join("release")
        .join("rayhunter-daemon")
}

/// Build the daemon artifact in the repository rooted at the current
/// directory, honoring the rebuild policy for an existing one.
pub fn build(policy: RebuildPolicy, verbose: bool) -> InstallerResult<PathBuf> {
    build_in(Path::new("."), policy, verbose)
}

/// As [`build`], rooted at an explicit directory
pub fn build_in(root: &Path, policy: RebuildPolicy, verbose: bool) -> InstallerResult<PathBuf> {
    let artifact = artifact_path(root);

    if artifact.exists() && !policy.should_rebuild(&artifact) {
        println!("  reusing existing artifact {}", artifact.display());
        return Ok(artifact);
    }

    if docker_ready() {
        println!("  building with docker image '{BUILD_IMAGE}'");
        build_with_docker(root, verbose)?;
    } else {
        println!("  building natively for {}", device::BUILD_TARGET);
        build_native(root, verbose)?;
    }

    if !artifact.exists() {
        return Err(InstallerError::ArtifactMissing { path: artifact });
    }
    Ok(artifact)
}

/// Container engine installed and its daemon answering
fn docker_ready() -> bool {
    if which::which("docker").is_err() {
        return false;
    }
    Command::new("docker")
        .arg("info")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn build_with_docker(root: &Path, verbose: bool) -> InstallerResult<()> {
    let mount = format!("{}:/workdir", root.canonicalize()?.display());
    let status = stage_command("docker", verbose)
        .args(["run", "--rm", "-v", &mount, BUILD_IMAGE])
        .status()
        .map_err(|e| InstallerError::CommandFailed {
            command: "docker run".to_string(),
            message: e.to_string(),
        })?;
    if !status.success() {
        return Err(InstallerError::BuildFailed {
            tool: "docker".to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

fn build_native(root: &Path, verbose: bool) -> InstallerResult<()> {
    if which::which("cargo").is_err() {
        return Err(InstallerError::ToolchainMissing {
            tool: "cargo".to_string(),
        });
    }
    if target_missing() {
        return Err(InstallerError::ToolchainMissing {
            tool: format!("rust target {}", device::BUILD_TARGET),
        });
    }
    if which::which(CROSS_LINKER).is_err() {
        eprintln!("⚠ cross linker '{CROSS_LINKER}' not found - the build may still link on its own");
    }

    let status = stage_command("cargo", verbose)
        .current_dir(root)
        .args([
            "build",
            "--release",
            "--target",
            device::BUILD_TARGET,
            "--bin",
            "rayhunter-daemon",
        ])
        .status()
        .map_err(|e| InstallerError::CommandFailed {
            command: "cargo build".to_string(),
            message: e.to_string(),
        })?;
    if !status.success() {
        return Err(InstallerError::BuildFailed {
            tool: "cargo".to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

/// True only when rustup is present and definitely lacks the target.
/// Without rustup the compiler may still know the target on its own.
fn target_missing() -> bool {
    if which::which("rustup").is_err() {
        return false;
    }
    Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .map(|out| {
            out.status.success()
                && !String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .any(|line| line.trim() == device::BUILD_TARGET)
        })
        .unwrap_or(false)
}

fn stage_command(tool: &str, verbose: bool) -> Command {
    let mut cmd = Command::new(tool);
    if verbose {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::inherit());
    }
    cmd
}
