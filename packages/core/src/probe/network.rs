//! Prober backed by the system resolver and plain TCP

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use dns_lookup::{AddrInfoHints, getaddrinfo, lookup_addr};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{HostProber, MAX_BANNER_LEN, ProbeError, Resolved};

/// Probes hosts over the network
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkProber;

impl NetworkProber {
    pub fn new() -> Self {
        Self
    }
}

/// `AI_CANONNAME` has this value on Linux, macOS, the BSDs and Windows
const AI_CANONNAME: i32 = 0x0002;

/// Canonical form of a host name: lowercase, no trailing dot
fn canonical_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Forward lookup returning the resolver's canonical name and the addresses
fn lookup_canonical(name: &str) -> io::Result<(Option<String>, Vec<IpAddr>)> {
    let hints = AddrInfoHints {
        flags: AI_CANONNAME,
        ..AddrInfoHints::default()
    };

    let mut canonical = None;
    let mut ips: Vec<IpAddr> = Vec::new();
    for info in getaddrinfo(Some(name), None, Some(hints)).map_err(io::Error::from)? {
        let info = info?;
        if canonical.is_none() {
            canonical = info.canonname.filter(|c| !c.is_empty());
        }
        let ip = info.sockaddr.ip();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
    Ok((canonical, ips))
}

/// Run a blocking resolver call off the async workers
async fn blocking<T, F>(call: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(io::Error::other)?
}

#[async_trait]
impl HostProber for NetworkProber {
    async fn resolve(&self, name: &str) -> Result<Resolved, ProbeError> {
        let resolve_err = |source| ProbeError::Resolve {
            host: name.to_string(),
            source,
        };

        if let Ok(ip) = name.parse::<IpAddr>() {
            // Reverse lookup; without a PTR record the address itself is the name
            let reverse = blocking(move || lookup_addr(&ip)).await;
            let canonical = match reverse {
                Ok(host) if !host.is_empty() => canonical_name(&host),
                Ok(_) => ip.to_string(),
                Err(e) => {
                    tracing::debug!("Reverse lookup of {} failed: {}", ip, e);
                    ip.to_string()
                }
            };
            return Ok(Resolved {
                canonical_name: canonical,
                ips: vec![ip],
            });
        }

        let query = name.trim_end_matches('.').to_string();
        let (canonical, ips) = blocking(move || lookup_canonical(&query))
            .await
            .map_err(resolve_err)?;

        if ips.is_empty() {
            return Err(ProbeError::NoAddresses(name.to_string()));
        }

        let canonical = canonical_name(canonical.as_deref().unwrap_or(name));
        tracing::debug!("Resolved {} as {} to {:?}", name, canonical, ips);
        Ok(Resolved {
            canonical_name: canonical,
            ips,
        })
    }

    async fn probe_banner(
        &self,
        host: &str,
        port: u16,
        probe_timeout: Duration,
    ) -> Result<String, ProbeError> {
        let attempt = async {
            let stream =
                TcpStream::connect((host, port))
                    .await
                    .map_err(|source| ProbeError::Connect {
                        host: host.to_string(),
                        port,
                        source,
                    })?;

            read_banner_line(stream)
                .await
                .map_err(|source| ProbeError::Read {
                    host: host.to_string(),
                    source,
                })
        };

        match timeout(probe_timeout, attempt).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ProbeError::Timeout {
                host: host.to_string(),
                timeout: probe_timeout,
            }),
        }
    }
}

/// Read the first line a server sends
///
/// Stops at `\r`, `\n`, end of stream, or after [`MAX_BANNER_LEN`] bytes.
/// The terminator is not included.
pub async fn read_banner_line<R>(reader: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(64);

    while line.len() < MAX_BANNER_LEN {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        };
        if byte == b'\r' || byte == b'\n' {
            break;
        }
        line.push(byte);
    }

    Ok(String::from_utf8_lossy(&line).into_owned())
}
