//! USB debug-bridge shell
//!
//! Wraps the `adb` binary for shell execution, file pushes and port
//! forwarding. If `adb` is not already on the PATH, a platform-specific
//! tools bundle is fetched once into the user cache directory and the
//! unpacked binary is used from there. Presence is the only check - a
//! corrupt or wrong-version binary is not detected here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{InstallerError, InstallerResult};
use crate::transport::CommandOutput;

const BUNDLE_BASE_URL: &str = "https://dl.google.com/android/repository";

/// Resolved debug-bridge shell
pub struct BridgeShell {
    adb: PathBuf,
}

/// Map a host OS to its platform-tools bundle URL
pub fn platform_bundle_url(os: &str) -> InstallerResult<String> {
    let tag = match os {
        "linux" => "linux",
        "macos" => "darwin",
        other => {
            return Err(InstallerError::UnsupportedPlatform {
                os: other.to_string(),
            })
        }
    };
    Ok(format!("{BUNDLE_BASE_URL}/platform-tools-latest-{tag}.zip"))
}

/// True if `adb forward --list` output already contains a
/// local-to-device binding for `port`, whatever the serial column says.
pub fn forward_exists(list_output: &str, port: u16) -> bool {
    let pair = format!("tcp:{port} tcp:{port}");
    list_output
        .lines()
        .any(|line| line.trim_end().ends_with(&pair))
}

impl BridgeShell {
    /// Resolve the bridge binary: PATH first, then a previously fetched
    /// bundle, then download and unpack one.
    pub fn resolve(verbose: bool) -> InstallerResult<Self> {
        if let Ok(adb) = which::which("adb") {
            if verbose {
                println!("  bridge: using {} from PATH", adb.display());
            }
            return Ok(Self { adb });
        }

        let root = cache_root()?;
        let cached = root.join("platform-tools").join("adb");
        if cached.exists() {
            if verbose {
                println!("  bridge: using cached bundle at {}", cached.display());
            }
            return Ok(Self { adb: cached });
        }

        let url = platform_bundle_url(std::env::consts::OS)?;
        println!("  bridge: fetching platform tools from {url}");
        fetch_bundle(&url, &root)?;
        if !cached.exists() {
            return Err(InstallerError::BridgeUnavailable {
                message: format!("bundle from {url} did not contain an adb binary"),
            });
        }
        mark_executable(&cached)?;
        Ok(Self { adb: cached })
    }

    pub fn path(&self) -> &Path {
        &self.adb
    }

    /// Run a shell command on the device, capturing output
    pub fn shell(&self, cmd: &str) -> InstallerResult<CommandOutput> {
        self.run(&["shell", cmd])
    }

    /// Probe convenience: true only if the command ran and succeeded
    pub fn shell_ok(&self, cmd: &str) -> bool {
        self.shell(cmd).map(|out| out.success).unwrap_or(false)
    }

    /// Push a local file to a device path
    pub fn push(&self, local: &Path, remote: &str) -> InstallerResult<()> {
        let local_str = local.display().to_string();
        let out = self.run(&["push", &local_str, remote])?;
        if !out.success {
            return Err(InstallerError::CommandFailed {
                command: format!("adb push {local_str} {remote}"),
                message: out.stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    /// List active port forwards
    pub fn forward_list(&self) -> InstallerResult<String> {
        Ok(self.run(&["forward", "--list"])?.stdout)
    }

    /// Create a local-to-device TCP forward
    pub fn forward(&self, local: u16, device: u16) -> InstallerResult<()> {
        let local_spec = format!("tcp:{local}");
        let device_spec = format!("tcp:{device}");
        let out = self.run(&["forward", &local_spec, &device_spec])?;
        if !out.success {
            return Err(InstallerError::CommandFailed {
                command: format!("adb forward {local_spec} {device_spec}"),
                message: out.stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    fn run(&self, args: &[&str]) -> InstallerResult<CommandOutput> {
        let output = Command::new(&self.adb)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| InstallerError::CommandFailed {
                command: format!("adb {}", args.join(" ")),
                message: e.to_string(),
            })?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn cache_root() -> InstallerResult<PathBuf> {
    let root = dirs::cache_dir()
        .ok_or_else(|| InstallerError::BridgeUnavailable {
            message: "no user cache directory to hold the platform tools".to_string(),
        })?
        .join("rayhunter-installer");
    fs::create_dir_all(&root)?;
    Ok(root)
}

fn fetch_bundle(url: &str, dest: &Path) -> InstallerResult<()> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| InstallerError::DownloadFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let mut archive_file = tempfile::NamedTempFile::new_in(dest)?;
    io::copy(&mut response.into_reader(), &mut archive_file)?;

    let mut archive = zip::ZipArchive::new(archive_file.reopen()?)?;
    archive.extract(dest)?;
    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> InstallerResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> InstallerResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_url_linux() {
        assert_eq!(
            platform_bundle_url("linux").unwrap(),
            "https://dl.google.com/android/repository/platform-tools-latest-linux.zip"
        );
    }

    #[test]
    fn bundle_url_macos_maps_to_darwin() {
        assert_eq!(
            platform_bundle_url("macos").unwrap(),
            "https://dl.google.com/android/repository/platform-tools-latest-darwin.zip"
        );
    }

    #[test]
    fn bundle_url_rejects_unknown_platform() {
        let err = platform_bundle_url("windows").unwrap_err();
        assert!(matches!(
            err,
            InstallerError::UnsupportedPlatform { os } if os == "windows"
        ));
    }

    #[test]
    fn forward_exists_matches_regardless_of_serial() {
        let list = "1234abcd tcp:8080 tcp:8080\n";
        assert!(forward_exists(list, 8080));
        assert!(forward_exists("emulator-5554 tcp:8080 tcp:8080", 8080));
    }

    #[test]
    fn forward_exists_ignores_other_ports() {
        let list = "1234abcd tcp:8081 tcp:8081\n1234abcd tcp:9000 tcp:8080\n";
        assert!(!forward_exists(list, 8080));
    }

    #[test]
    fn forward_exists_on_empty_list() {
        assert!(!forward_exists("", 8080));
    }
}
