//! Concurrent discovery and refresh batches
//!
//! Every host is probed as an independent future, at most
//! [`BatchOptions::concurrency`] at a time. A failing host only changes its
//! own outcome; the batch always completes. Progress is reported as
//! [`ProbeEvent`]s on an optional channel that the caller drains.

use std::net::IpAddr;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use super::{DEFAULT_PROBE_TIMEOUT, HostProber, SSH_PORT};
use crate::host::{HostRecord, HostTags, short_name};

/// Progress reported while a batch runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A batch of `total` hosts started
    Started { total: usize },
    /// A discovery input resolved
    Discovered { input: String, ips: Vec<IpAddr> },
    /// A discovery input could not be resolved and was dropped
    Unresolved { input: String, reason: String },
    /// A refreshed host answered with a banner
    Reachable { name: String, banner: String },
    /// A refreshed host did not answer and was disabled
    Unreachable { name: String, reason: String },
}

/// Channel end batches report progress to
pub type ProbeSink = mpsc::UnboundedSender<ProbeEvent>;

/// Tuning for a probe batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub ssh_port: u16,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            ssh_port: SSH_PORT,
            timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: 32,
        }
    }
}

fn emit(sink: Option<&ProbeSink>, event: ProbeEvent) {
    if let Some(sink) = sink {
        // Receiver gone means nobody is watching progress
        let _ = sink.send(event);
    }
}

/// Resolve new host names into fresh records
///
/// Empty inputs are skipped and unresolvable inputs are dropped. Results come
/// back in completion order.
pub async fn discover<P>(
    prober: &P,
    names: &[String],
    tags: &HostTags,
    options: &BatchOptions,
    sink: Option<&ProbeSink>,
) -> Vec<HostRecord>
where
    P: HostProber + ?Sized,
{
    let inputs: Vec<&str> = names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();

    emit(sink, ProbeEvent::Started { total: inputs.len() });

    stream::iter(inputs)
        .map(|input| {
            let span = tracing::info_span!("discover", input = %input);
            discover_one(prober, input, tags, sink).instrument(span)
        })
        .buffer_unordered(options.concurrency.max(1))
        .filter_map(std::future::ready)
        .collect()
        .await
}

async fn discover_one<P>(
    prober: &P,
    input: &str,
    tags: &HostTags,
    sink: Option<&ProbeSink>,
) -> Option<HostRecord>
where
    P: HostProber + ?Sized,
{
    match prober.resolve(input).await {
        Ok(resolved) => {
            tracing::info!("{} -> {:?}", input, resolved.ips);
            emit(
                sink,
                ProbeEvent::Discovered {
                    input: input.to_string(),
                    ips: resolved.ips.clone(),
                },
            );
            let ips = resolved.ips.iter().map(IpAddr::to_string).collect();
            Some(HostRecord::new(short_name(input), resolved.canonical_name, ips).with_tags(tags))
        }
        Err(e) => {
            tracing::warn!("Dropping {}: {}", input, e);
            emit(
                sink,
                ProbeEvent::Unresolved {
                    input: input.to_string(),
                    reason: e.to_string(),
                },
            );
            None
        }
    }
}

/// Re-resolve and probe existing records
///
/// Returns one updated record per input, in completion order. The fqdn is
/// never changed; if it no longer resolves the previous addresses are kept.
/// A host that answers on the SSH port is enabled and its banner stored, a
/// host that does not is disabled.
pub async fn refresh<P>(
    prober: &P,
    hosts: &[HostRecord],
    options: &BatchOptions,
    sink: Option<&ProbeSink>,
) -> Vec<HostRecord>
where
    P: HostProber + ?Sized,
{
    emit(sink, ProbeEvent::Started { total: hosts.len() });

    stream::iter(hosts)
        .map(|host| {
            let span = tracing::info_span!("refresh", host = %host.name);
            refresh_one(prober, host.clone(), options, sink).instrument(span)
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await
}

async fn refresh_one<P>(
    prober: &P,
    mut host: HostRecord,
    options: &BatchOptions,
    sink: Option<&ProbeSink>,
) -> HostRecord
where
    P: HostProber + ?Sized,
{
    match prober.resolve(&host.fqdn).await {
        Ok(resolved) => {
            host.ips = resolved.ips.iter().map(IpAddr::to_string).collect();
        }
        Err(e) => {
            tracing::warn!("Keeping previous addresses of {}: {}", host.name, e);
        }
    }

    match prober
        .probe_banner(&host.fqdn, options.ssh_port, options.timeout)
        .await
    {
        Ok(banner) => {
            tracing::info!("{} -> {}", host.name, banner);
            host.enabled = true;
            if !banner.is_empty() {
                host.ssh_server_version = Some(banner.clone());
            }
            emit(
                sink,
                ProbeEvent::Reachable {
                    name: host.name.clone(),
                    banner,
                },
            );
        }
        Err(e) => {
            tracing::warn!("Host {} is not reachable, disabling: {}", host.name, e);
            host.enabled = false;
            emit(
                sink,
                ProbeEvent::Unreachable {
                    name: host.name.clone(),
                    reason: e.to_string(),
                },
            );
        }
    }

    host
}
