//! Host probing
//!
//! Name resolution and SSH banner retrieval behind the [`HostProber`] trait,
//! plus the concurrent discovery and refresh batches built on it.

mod batch;
mod network;

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use batch::{BatchOptions, ProbeEvent, ProbeSink, discover, refresh};
pub use network::{NetworkProber, read_banner_line};

/// Default SSH port
pub const SSH_PORT: u16 = 22;

/// Default connect and read timeout for a banner probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest banner line that is read, excluding the terminator
pub const MAX_BANNER_LEN: usize = 255;

/// Result of resolving a host name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Canonical name used as the registry merge key
    pub canonical_name: String,
    /// Resolved addresses, in resolver order without duplicates
    pub ips: Vec<IpAddr>,
}

/// Per-host probe failures
///
/// These never abort a batch; they become `enabled = false` or a dropped
/// discovery input.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No addresses found for {0}")]
    NoAddresses(String),

    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {timeout:?} probing {host}")]
    Timeout { host: String, timeout: Duration },

    #[error("Failed to read banner from {host}: {source}")]
    Read {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolution and banner retrieval for a single host
#[async_trait]
pub trait HostProber: Send + Sync {
    /// Resolve a name or IP literal to its canonical name and addresses
    async fn resolve(&self, name: &str) -> Result<Resolved, ProbeError>;

    /// Connect to `host:port` and return the first line the server sends
    async fn probe_banner(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<String, ProbeError>;
}
