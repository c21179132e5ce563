//! Settings schema for sshconfig
//!
//! Defines the structure and defaults for the optional settings file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::{BatchOptions, SSH_PORT};

/// Settings loaded from `~/.config/sshconfig/config.json`
///
/// Every field is optional in the file; command-line flags override them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Settings file version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Registry database path (default: `~/.sshconfig.json`)
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// SSH config path (default: `~/.ssh/config`)
    #[serde(default)]
    pub ssh_config: Option<PathBuf>,

    /// Port probed for the SSH banner (default: 22)
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// Connect and read timeout for one probe in seconds (default: 5)
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Maximum number of hosts probed at the same time (default: 32)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Add a `User` line to every generated block (default: false)
    #[serde(default)]
    pub set_user: bool,
}

fn default_version() -> u32 {
    1
}

fn default_ssh_port() -> u16 {
    SSH_PORT
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_concurrency() -> usize {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: None,
            ssh_config: None,
            ssh_port: default_ssh_port(),
            probe_timeout_secs: default_probe_timeout_secs(),
            concurrency: default_concurrency(),
            set_user: false,
        }
    }
}

impl Config {
    /// Check value ranges serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_secs == 0 {
            return Err("probe_timeout_secs must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.ssh_port == 0 {
            return Err("ssh_port must not be 0".to_string());
        }
        Ok(())
    }

    /// Probe batch tuning derived from these settings
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            ssh_port: self.ssh_port,
            timeout: Duration::from_secs(self.probe_timeout_secs),
            concurrency: self.concurrency,
        }
    }
}
