//! Deployment staging
//!
//! Stages configuration, the daemon binary and service-management
//! scripts onto the device. Idempotent by construction: every staged
//! file is simply overwritten, so re-running against an already
//! provisioned device produces an identical on-device file set.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::device;
use crate::error::{InstallerError, InstallerResult};
use crate::transport::{Dispatcher, Transports};

/// Where service scripts are looked up locally, in preference order
pub fn unit_search_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("scripts"), PathBuf::from("dist/scripts")]
}

/// Find a service script under the given roots, first match wins
pub fn locate_unit(roots: &[PathBuf], unit: &str) -> Option<PathBuf> {
    roots.iter().map(|root| root.join(unit)).find(|p| p.exists())
}

/// Stage everything onto the device
pub fn deploy(
    transports: &Transports,
    artifact: &Path,
    config_path: &Path,
    verbose: bool,
) -> InstallerResult<()> {
    let dispatcher = Dispatcher::new(transports, verbose);

    // the data directory needs root to create; a transport error is
    // fatal, a merely unsuccessful command is not
    dispatcher.privileged(&format!("mkdir -p {}", device::DATA_DIR))?;

    // the service may not be running - errors ignored
    let _ = dispatcher.privileged(&format!(
        "{}/{} stop",
        device::INIT_DIR,
        device::DAEMON_UNIT
    ));

    stage_config(transports, &dispatcher, config_path)?;
    stage_daemon(transports, &dispatcher, artifact)?;

    for unit in [device::DAEMON_UNIT, device::MISC_UNIT] {
        stage_unit(transports, &dispatcher, unit)?;
    }

    Ok(())
}

fn stage_config(
    transports: &Transports,
    dispatcher: &Dispatcher<'_>,
    config_path: &Path,
) -> InstallerResult<()> {
    let (config, created) = Config::load_or_create(config_path)?;
    if created {
        println!(
            "  no local config found - wrote defaults to {}",
            config_path.display()
        );
    }
    println!("  staging config (port {})", config.port);
    transports.bridge.push(config_path, device::CONFIG_PATH)?;
    let _ = dispatcher.privileged(&format!("chmod 644 {}", device::CONFIG_PATH));
    Ok(())
}

fn stage_daemon(
    transports: &Transports,
    dispatcher: &Dispatcher<'_>,
    artifact: &Path,
) -> InstallerResult<()> {
    if !artifact.exists() {
        return Err(InstallerError::ArtifactMissing {
            path: artifact.to_path_buf(),
        });
    }
    println!("  staging daemon binary");
    transports.bridge.push(artifact, device::DAEMON_PATH)?;
    let _ = dispatcher.privileged(&format!("chmod 755 {}", device::DAEMON_PATH));
    Ok(())
}

/// Init scripts live under a root-only directory, so they hop through
/// the scratch area and are moved into place with a privileged command.
fn stage_unit(
    transports: &Transports,
    dispatcher: &Dispatcher<'_>,
    unit: &str,
) -> InstallerResult<()> {
    let Some(source) = locate_unit(&unit_search_roots(), unit) else {
        eprintln!("⚠ service script '{unit}' not found locally - skipping that unit");
        return Ok(());
    };

    println!("  staging service script '{unit}'");
    let staged = format!("{}/{unit}", device::TMP_DIR);
    let installed = format!("{}/{unit}", device::INIT_DIR);
    transports.bridge.push(&source, &staged)?;
    let _ = dispatcher.privileged(&format!("mv {staged} {installed}"));
    let _ = dispatcher.privileged(&format!("chmod 755 {installed}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn locate_unit_prefers_first_root() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("scripts");
        let fallback = dir.path().join("dist/scripts");
        fs::create_dir_all(&primary).unwrap();
        fs::create_dir_all(&fallback).unwrap();
        fs::write(primary.join("rayhunter_daemon"), "#!/bin/sh\n").unwrap();
        fs::write(fallback.join("rayhunter_daemon"), "#!/bin/sh\n").unwrap();

        let roots = vec![primary.clone(), fallback];
        let found = locate_unit(&roots, "rayhunter_daemon").unwrap();
        assert_eq!(found, primary.join("rayhunter_daemon"));
    }

    #[test]
    fn locate_unit_falls_back_to_packaged_location() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("scripts");
        let fallback = dir.path().join("dist/scripts");
        fs::create_dir_all(&fallback).unwrap();
        fs::write(fallback.join("misc-daemon"), "#!/bin/sh\n").unwrap();

        let roots = vec![primary, fallback.clone()];
        let found = locate_unit(&roots, "misc-daemon").unwrap();
        assert_eq!(found, fallback.join("misc-daemon"));
    }

    #[test]
    fn locate_unit_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let roots = vec![dir.path().join("scripts")];
        assert!(locate_unit(&roots, "rayhunter_daemon").is_none());
    }
}
