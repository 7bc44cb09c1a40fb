//! Daemon configuration staged to the device
//!
//! The key set mirrors what the on-device daemon parses, so the staged
//! file is accepted verbatim. When no local file exists a default one
//! is synthesized and persisted, so repeated runs stage identical
//! contents.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InstallerResult;

/// Daemon configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_qmdl_store_path")]
    pub qmdl_store_path: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_ui_level")]
    pub ui_level: u8,

    #[serde(default)]
    pub enable_dummy_analyzer: bool,

    #[serde(default)]
    pub colorblind_mode: bool,

    #[serde(default)]
    pub full_background_color: bool,

    #[serde(default = "default_true")]
    pub show_screen_overlay: bool,

    #[serde(default = "default_true")]
    pub enable_animation: bool,
}

fn default_qmdl_store_path() -> String {
    "/data/rayhunter/qmdl".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ui_level() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            qmdl_store_path: default_qmdl_store_path(),
            port: default_port(),
            debug_mode: false,
            ui_level: default_ui_level(),
            enable_dummy_analyzer: false,
            colorblind_mode: false,
            full_background_color: false,
            show_screen_overlay: true,
            enable_animation: true,
        }
    }
}

impl Config {
    /// Load a config file, filling unset keys with defaults
    pub fn load(path: &Path) -> InstallerResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the local config, synthesizing and persisting a default one
    /// if the file does not exist yet.
    ///
    /// Returns the config and whether it was freshly created.
    pub fn load_or_create(path: &Path) -> InstallerResult<(Self, bool)> {
        if path.exists() {
            return Ok((Self::load(path)?, false));
        }
        let config = Self::default();
        fs::write(path, toml::to_string_pretty(&config)?)?;
        Ok((config, true))
    }
}
