//! Path resolution for livedeck configuration files.
//!
//! ```text
//! ~/.config/livedeck/          # Config directory (platform config dir on other OSes)
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "livedeck";
const CONFIG_FILE: &str = "config.toml";

/// Path management for livedeck.
pub struct LivedeckPaths;

impl LivedeckPaths {
    /// Returns the livedeck configuration directory (e.g., `~/.config/livedeck/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
