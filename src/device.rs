//! Fixed on-device filesystem layout and process names
//!
//! Everything the pipeline writes or observes on the device lives at a
//! well-known path.

/// Setuid helper installed to gain root through the unprivileged bridge shell
pub const ROOTSHELL_PATH: &str = "/bin/rootshell";

/// Data directory holding the daemon, its config and QMDL captures
pub const DATA_DIR: &str = "/data/rayhunter";

/// Deployed daemon binary
pub const DAEMON_PATH: &str = "/data/rayhunter/rayhunter-daemon";

/// Deployed daemon configuration
pub const CONFIG_PATH: &str = "/data/rayhunter/config.toml";

/// Init script directory
pub const INIT_DIR: &str = "/etc/init.d";

/// Scratch area reachable by an unprivileged bridge push
pub const TMP_DIR: &str = "/tmp";

/// Main daemon init script name
pub const DAEMON_UNIT: &str = "rayhunter_daemon";

/// Auxiliary init script name
pub const MISC_UNIT: &str = "misc-daemon";

/// Process whose presence signals the device finished booting
pub const AGENT_PROCESS: &str = "atfwd_daemon";

/// Process name of the deployed daemon
pub const DAEMON_PROCESS: &str = "rayhunter-daemon";

/// Target triple the daemon is cross-compiled for
pub const BUILD_TARGET: &str = "armv7-unknown-linux-musleabihf";
