//! Settings management for sshconfig
//!
//! Loads and validates the optional JSONC settings file. A missing file
//! means defaults; the file is never created implicitly.

pub mod paths;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use jsonc_parser::parse_to_serde_value;
use thiserror::Error;

pub use paths::{
    expand_home, get_config_dir, get_database_path, get_home_dir, get_settings_path,
    get_ssh_config_path,
};
pub use schema::Config;

/// Errors that can occur while loading the settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSONC or does not match the schema
    #[error("Invalid settings file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A value is out of range
    #[error("Invalid settings file {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Load settings from the default settings path
///
/// Falls back to defaults when no home directory can be determined.
pub fn load_config() -> Result<Config, ConfigError> {
    match get_settings_path() {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("No home directory, using default settings");
            Ok(Config::default())
        }
    }
}

/// Load settings from `path`
///
/// Supports JSONC (JSON with comments). Rejects unknown fields. A missing or
/// blank file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("Settings file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    // Parse JSONC (JSON with comments)
    let Some(value) = parse_to_serde_value(&contents, &Default::default())
        .map_err(|e| parse_err(e.to_string()))?
    else {
        tracing::debug!("Settings file is empty, using defaults: {}", path.display());
        return Ok(Config::default());
    };

    // deny_unknown_fields rejects unknown keys here
    let config: Config = serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;

    config.validate().map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(config)
}
