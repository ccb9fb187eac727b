//! Path management for chatrelay configuration and store files.
//!
//! Directories are resolved with the `dirs` crate so the layout follows the
//! platform conventions (XDG on Linux, Application Support on macOS,
//! AppData on Windows).

use std::path::PathBuf;

const APP_DIR: &str = "chatrelay";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
    /// The platform data directory could not be determined.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for chatrelay_core::ChatRelayError {
    fn from(err: PathError) -> Self {
        chatrelay_core::ChatRelayError::config(err.to_string())
    }
}

/// Path management for chatrelay.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/chatrelay/         # Config directory
/// └── config.toml              # RelayConfig
///
/// ~/.local/share/chatrelay/    # Data directory
/// └── store.json               # Default key-value store
/// ```
pub struct ChatRelayPaths;

impl ChatRelayPaths {
    /// Returns the chatrelay configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the chatrelay data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the store file used when the configuration names none.
    pub fn default_store_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store.json"))
    }
}
