//! sshconfig-core - Core library for sshconfig
//!
//! Keeps a registry of known hosts and projects it into generated blocks of
//! `~/.ssh/config` without touching hand-written entries.

pub mod backup;
pub mod config;
pub mod host;
pub mod probe;
pub mod ssh_config;
pub mod version;

// Re-export version functions for Rust consumers
pub use version::{get_version, get_version_long};

pub use config::{Config, ConfigError, load_config, load_config_from};
pub use host::{
    HostError, HostFilter, HostRecord, HostTags, MergeSummary, Registry, ValidationError,
    read_hosts, write_hosts,
};
pub use probe::{BatchOptions, HostProber, NetworkProber, ProbeError, ProbeEvent, ProbeSink};
pub use ssh_config::{SaveOptions, SshConfigError, SshConfigFile};
