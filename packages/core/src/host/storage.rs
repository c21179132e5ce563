//! Host registry storage
//!
//! Load and save the registry document (`~/.sshconfig.json` by default),
//! merge probe results into it, and read/write standalone host lists for
//! import and export.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::HostError;
use super::merge::merge;
use super::schema::{HostFilter, HostRecord, now_millis};
use super::validation::validate_hosts;
use crate::backup::move_to_backup;

/// Outcome of a merge-update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Records appended because their fqdn was unknown
    pub added: usize,
    /// Existing records overwritten field by field
    pub updated: usize,
}

/// The persistent list of host records
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    hosts: Vec<HostRecord>,
}

impl Registry {
    /// Create an empty registry bound to `path` without touching the disk
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hosts: Vec::new(),
        }
    }

    /// Load the registry document
    ///
    /// Returns an empty registry if the file doesn't exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!(
                "Registry not found, starting empty: {}",
                path.display()
            );
            return Ok(Self::empty(path));
        }

        let contents = fs::read_to_string(&path).map_err(|source| HostError::Read {
            path: path.clone(),
            source,
        })?;

        let hosts: Vec<HostRecord> =
            serde_json::from_str(&contents).map_err(|source| HostError::Decode {
                origin: path.display().to_string(),
                source,
            })?;

        tracing::debug!("Loaded {} hosts from {}", hosts.len(), path.display());
        Ok(Self { path, hosts })
    }

    /// Path of the registry document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of all records
    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Find a record by its merge key
    pub fn find(&self, fqdn: &str) -> Option<&HostRecord> {
        self.hosts.iter().find(|h| h.fqdn == fqdn)
    }

    /// Merge incoming records by fqdn, stamping updates with the current time
    pub fn merge_update(&mut self, incoming: Vec<HostRecord>) -> MergeSummary {
        self.merge_update_at(incoming, now_millis())
    }

    /// Merge incoming records by fqdn
    ///
    /// Unknown fqdns are appended unchanged; known ones are merged field by
    /// field (see [`merge`]) and stamped with `now`.
    pub fn merge_update_at(
        &mut self,
        incoming: Vec<HostRecord>,
        now: DateTime<Utc>,
    ) -> MergeSummary {
        tracing::debug!(
            "Updating {} hosts with {} inputs",
            self.hosts.len(),
            incoming.len()
        );

        let mut summary = MergeSummary::default();
        for host in incoming {
            match self.hosts.iter().position(|h| h.fqdn == host.fqdn) {
                Some(index) => {
                    tracing::info!("Updating known host {}", host.fqdn);
                    self.hosts[index] = merge(&self.hosts[index], &host, now);
                    summary.updated += 1;
                }
                None => {
                    tracing::info!("Adding unknown host {}", host.fqdn);
                    self.hosts.push(host);
                    summary.added += 1;
                }
            }
        }
        summary
    }

    /// Discard the current list and adopt `hosts`
    pub fn replace(&mut self, hosts: Vec<HostRecord>) {
        tracing::debug!(
            "Replacing {} hosts with {} hosts",
            self.hosts.len(),
            hosts.len()
        );
        self.hosts = hosts;
    }

    /// Records matching the filter, in registry order
    pub fn export_filtered(&self, filter: &HostFilter) -> Vec<HostRecord> {
        self.hosts
            .iter()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect()
    }

    /// Save the registry document
    ///
    /// Validates every record first; on a validation error nothing on disk
    /// is touched. Otherwise the existing file is moved to its `.bak` path
    /// and the full list is written.
    pub fn save(&self) -> Result<(), HostError> {
        validate_hosts(&self.hosts)?;

        let json = serde_json::to_string_pretty(&self.hosts).map_err(HostError::Encode)?;

        let write_err = |source| HostError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        move_to_backup(&self.path).map_err(write_err)?;
        fs::write(&self.path, format!("{json}\n")).map_err(write_err)?;

        tracing::debug!(
            "Saved {} hosts to {}",
            self.hosts.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Read and validate a host list, e.g. for import
///
/// `origin` names the source in error messages.
pub fn read_hosts<R: Read>(mut reader: R, origin: &str) -> Result<Vec<HostRecord>, HostError> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|source| HostError::Read {
            path: PathBuf::from(origin),
            source,
        })?;

    let hosts: Vec<HostRecord> =
        serde_json::from_str(&contents).map_err(|source| HostError::Decode {
            origin: origin.to_string(),
            source,
        })?;

    validate_hosts(&hosts)?;
    tracing::debug!("Read {} hosts from {}", hosts.len(), origin);
    Ok(hosts)
}

/// Validate and write a host list, e.g. for export
///
/// The writer is flushed but not closed.
pub fn write_hosts<W: Write>(mut writer: W, hosts: &[HostRecord]) -> Result<(), HostError> {
    validate_hosts(hosts)?;

    let json = serde_json::to_string_pretty(hosts).map_err(HostError::Encode)?;
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.write_all(b"\n"))
        .and_then(|_| writer.flush())
        .map_err(HostError::Export)?;
    Ok(())
}
