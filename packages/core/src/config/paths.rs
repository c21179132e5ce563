//! Default path resolution for sshconfig
//!
//! All defaults live below the user's home directory:
//! - registry: `~/.sshconfig.json`
//! - ssh config: `~/.ssh/config`
//! - settings: `~/.config/sshconfig/config.json`

use std::path::{Path, PathBuf};

/// Get the user's home directory
pub fn get_home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Get the settings directory path
///
/// XDG-style `~/.config/sshconfig/` on every platform, like the ssh files
/// it manages.
pub fn get_config_dir() -> Option<PathBuf> {
    get_home_dir().map(|home| home.join(".config").join("sshconfig"))
}

/// Get the full path to the settings file
///
/// Returns: `{config_dir}/config.json`
pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join("config.json"))
}

/// Get the default registry database path
///
/// Returns: `~/.sshconfig.json`
pub fn get_database_path() -> Option<PathBuf> {
    get_home_dir().map(|home| home.join(".sshconfig.json"))
}

/// Get the default ssh config path
///
/// Returns: `~/.ssh/config`
pub fn get_ssh_config_path() -> Option<PathBuf> {
    get_home_dir().map(|home| home.join(".ssh").join("config"))
}

/// Expand a leading `~/` against `home`
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
