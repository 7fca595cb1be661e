//! Platform directory helpers.

use crate::error::ApiError;
use std::path::PathBuf;

/// Carton's data directory, e.g. `$XDG_DATA_HOME/carton` on Linux.
pub fn data_home() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "carton", "carton").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory of the local record store: `<data dir>/records`
pub fn default_store_dir() -> Result<PathBuf, ApiError> {
    let data_home = data_home().ok_or_else(|| {
        ApiError::ConfigError("Could not determine data directory (HOME not set)".to_string())
    })?;
    Ok(data_home.join("records"))
}

/// Global config file: `<config dir>/carton/config.toml`, if the platform has one.
pub fn config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "carton", "carton")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
