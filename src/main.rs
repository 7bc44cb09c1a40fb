//! Rayhunter installer CLI
//!
//! Drives the full provisioning pipeline against a connected device:
//!
//!   resolve transports -> force debug mode -> escalate privilege ->
//!   build -> deploy -> reboot -> verify
//!
//! Exit status: 0 on success, 1 on a fatal pipeline error, 2 when the
//! deployment completed but connectivity verification timed out.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use rayhunter_installer::{
    build, config::Config, deploy, device, escalate, reboot, transport::Transports, verify, wait,
    EscalationOutcome, InstallerResult, PollSpec, RebuildPolicy, VerifyOutcome, VERIFY_BUDGET,
};

/// Rayhunter installer - provision the diagnostic daemon on a hotspot device
#[derive(Parser, Debug)]
#[command(name = "rayhunter-installer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Diagnostic detail (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Reuse an existing build artifact instead of building
    #[arg(long)]
    skip_build: bool,

    /// Rebuild even if an artifact already exists
    #[arg(long, conflicts_with = "skip_build")]
    force_rebuild: bool,

    /// Local daemon config file to stage
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Ceiling in seconds for device bring-up waits (0 waits forever)
    #[arg(long, default_value_t = 300)]
    boot_timeout: u64,

    /// HTTP port to verify (defaults to the staged config's port)
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> Result<()> {
    let cli = apply_env_overrides(Cli::parse());

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    match run_pipeline(&cli, &running) {
        Ok((VerifyOutcome::Reachable, port)) => {
            println!();
            println!("🟢 Install complete");
            println!("  daemon deployed to {}", device::DAEMON_PATH);
            println!("  web UI at http://localhost:{port}/");
            Ok(())
        }
        Ok((VerifyOutcome::TimedOut, port)) => {
            println!();
            eprintln!(
                "🟡 Deployment complete, but the daemon did not answer within {}s",
                VERIFY_BUDGET.as_secs()
            );
            eprintln!("  try re-establishing the forward and opening the UI yourself:");
            eprintln!("    adb forward tcp:{port} tcp:{port}");
            eprintln!("    open http://localhost:{port}/");
            process::exit(2);
        }
        Err(err) => {
            eprintln!();
            eprintln!("✗ {err}");
            process::exit(1);
        }
    }
}

/// Environment toggles mirroring the CLI flags
fn apply_env_overrides(mut cli: Cli) -> Cli {
    if env_flag("RAYHUNTER_INSTALL_VERBOSE") {
        cli.verbose = cli.verbose.max(1);
    }
    if env_flag("RAYHUNTER_INSTALL_SKIP_BUILD") {
        cli.skip_build = true;
    }
    cli
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn run_pipeline(
    cli: &Cli,
    running: &Arc<AtomicBool>,
) -> InstallerResult<(VerifyOutcome, u16)> {
    let verbose = cli.verbose > 0;
    let boot_spec = PollSpec::boot(cli.boot_timeout);

    println!("🛰  Rayhunter installer");
    println!();

    println!("[1/7] Resolving transports");
    let transports = Transports::resolve(verbose)?;

    println!("[2/7] Forcing debug mode");
    force_debug_mode(&transports, &boot_spec, running)?;

    println!("[3/7] Installing root helper");
    let escalation = escalate::escalate(&transports, running, verbose)?;
    if escalation != EscalationOutcome::Escalated {
        eprintln!("⚠ continuing without verified root - privileged steps become best-effort");
    }

    println!("[4/7] Building the daemon");
    let artifact = if cli.skip_build {
        println!("  build skipped");
        build::artifact_path(Path::new("."))
    } else {
        let policy = if cli.force_rebuild {
            RebuildPolicy::Always
        } else {
            RebuildPolicy::Prompt
        };
        build::build(policy, verbose)?
    };

    println!("[5/7] Deploying to the device");
    deploy::deploy(&transports, &artifact, &cli.config, verbose)?;

    println!("[6/7] Rebooting the device");
    reboot::reboot(&transports, &boot_spec, running, verbose)?;

    println!("[7/7] Verifying connectivity");
    let port = resolve_port(cli);
    let outcome = verify::verify(&transports, port, running, verbose)?;
    Ok((outcome, port))
}

/// Switch the device into its debug state and wait for it to settle.
/// The serial channel is the only way to trigger the switch; without
/// it the operator must have forced debug mode already.
fn force_debug_mode(
    transports: &Transports,
    spec: &PollSpec,
    running: &Arc<AtomicBool>,
) -> InstallerResult<()> {
    match &transports.serial {
        Some(serial) => match serial.enable_debug_mode() {
            Ok(out) if out.success => {}
            Ok(_) => eprintln!("⚠ debug-mode switch was not confirmed, waiting for the shell anyway"),
            Err(err) => eprintln!("⚠ debug-mode switch failed ({err}), waiting for the shell anyway"),
        },
        None => {
            eprintln!("⚠ no serial channel - assuming the device is already in debug mode");
        }
    }
    wait::wait_for_shell_up(&transports.bridge, spec, running)?;
    wait::wait_for_boot_agent(&transports.bridge, spec, running)?;
    Ok(())
}

/// The verify port is re-derived from the staged config file, not
/// carried over from the deploy stage in memory.
fn resolve_port(cli: &Cli) -> u16 {
    if let Some(port) = cli.port {
        return port;
    }
    Config::load(&cli.config)
        .map(|config| config.port)
        .unwrap_or_else(|_| Config::default().port)
}
