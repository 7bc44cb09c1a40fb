//! Error types for the installer
//!
//! Uses `thiserror` for the library error enum; the binary wraps these
//! in `anyhow` at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for installer operations
pub type InstallerResult<T> = Result<T, InstallerError>;

/// Main error type for installer operations
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Host OS has no debug-bridge bundle we can fetch
    #[error("unsupported host platform '{os}' - only linux and macos are supported")]
    UnsupportedPlatform { os: String },

    /// Fetching the debug-bridge bundle failed
    #[error("failed to download {url}: {message}")]
    DownloadFailed { url: String, message: String },

    /// The debug bridge could not be resolved at all
    #[error("debug bridge unavailable: {message}")]
    BridgeUnavailable { message: String },

    /// A host-side command could not be spawned or run
    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// A required build tool is not installed
    #[error("required build tool '{tool}' not found on PATH")]
    ToolchainMissing { tool: String },

    /// The underlying build tool reported an error
    #[error("build via {tool} failed with exit code {code:?}")]
    BuildFailed { tool: String, code: Option<i32> },

    /// Expected build artifact is absent
    #[error("build artifact not found at {path} - run without --skip-build first")]
    ArtifactMissing { path: PathBuf },

    /// A bounded wait elapsed without its condition becoming true
    #[error("timed out after {secs}s waiting for {label}")]
    WaitTimeout { label: String, secs: u64 },

    /// Operator interrupted the run
    #[error("interrupted by operator")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("config parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("config serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Archive extraction error
    #[error("archive extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_platform() {
        let err = InstallerError::UnsupportedPlatform {
            os: "freebsd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported host platform 'freebsd' - only linux and macos are supported"
        );
    }

    #[test]
    fn test_error_display_wait_timeout() {
        let err = InstallerError::WaitTimeout {
            label: "device shell".to_string(),
            secs: 300,
        };
        assert_eq!(
            err.to_string(),
            "timed out after 300s waiting for device shell"
        );
    }

    #[test]
    fn test_error_display_artifact_missing() {
        let err = InstallerError::ArtifactMissing {
            path: PathBuf::from("target/release/rayhunter-daemon"),
        };
        assert!(err.to_string().contains("target/release/rayhunter-daemon"));
    }
}
