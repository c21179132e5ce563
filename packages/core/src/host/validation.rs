//! Host record validation
//!
//! Structural and semantic checks run before a registry document is written
//! or an imported list is accepted. Validation is fail-fast: the first
//! violation found is reported together with its field path and value.

use std::collections::HashSet;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::schema::{HostRecord, now_millis};

/// A single constraint violation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation error for {field}: {reason}. Value: {value:?}")]
pub struct ValidationError {
    /// Path of the offending field, e.g. `hosts[2].ips[0]`
    pub field: String,
    /// The rejected value as text
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    fn within(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

/// Maximum length of a hostname (RFC 1123)
const MAX_HOSTNAME_LENGTH: usize = 253;

/// Maximum length of a single hostname label (RFC 1123)
const MAX_LABEL_LENGTH: usize = 63;

/// Check whether a string is an IPv4 or IPv6 literal
pub fn is_ip_literal(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

/// Check whether a string looks like a resolvable hostname
///
/// Labels are 1-63 characters of ASCII alphanumerics, `-` or `_`, and do not
/// start or end with `-`. A single trailing dot is accepted.
pub fn is_valid_hostname(value: &str) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LENGTH {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// Validate a single record against the current time
pub fn validate_host(host: &HostRecord) -> Result<(), ValidationError> {
    validate_host_at(host, now_millis())
}

/// Validate a single record against an explicit "now"
pub fn validate_host_at(host: &HostRecord, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if host.id.is_nil() {
        return Err(ValidationError::new("id", host.id.to_string(), "must be set"));
    }

    if host.name.is_empty() {
        return Err(ValidationError::new("name", "", "must not be empty"));
    }

    if host.fqdn.is_empty() {
        return Err(ValidationError::new("fqdn", "", "must not be empty"));
    }
    if !is_ip_literal(&host.fqdn) && !is_valid_hostname(&host.fqdn) {
        return Err(ValidationError::new(
            "fqdn",
            host.fqdn.as_str(),
            "is neither an IP address nor a valid hostname",
        ));
    }

    if host.ips.is_empty() {
        return Err(ValidationError::new("ips", "[]", "must not be empty"));
    }
    for (i, ip) in host.ips.iter().enumerate() {
        if !is_ip_literal(ip) {
            return Err(ValidationError::new(
                format!("ips[{i}]"),
                ip.as_str(),
                "IP address is invalid",
            ));
        }
    }

    if let Some(version) = &host.ssh_server_version {
        if version.is_empty() {
            return Err(ValidationError::new(
                "sshServerVersion",
                "",
                "must not be empty when present",
            ));
        }
    }

    check_tag("user", host.user.as_deref())?;
    check_tag("group", host.group.as_deref())?;

    if host.created_at > now {
        return Err(ValidationError::new(
            "createdAt",
            host.created_at.to_rfc3339(),
            "must not lie in the future",
        ));
    }
    if host.updated_at > now {
        return Err(ValidationError::new(
            "updatedAt",
            host.updated_at.to_rfc3339(),
            "must not lie in the future",
        ));
    }
    if host.created_at > host.updated_at {
        return Err(ValidationError::new(
            "updatedAt",
            host.updated_at.to_rfc3339(),
            "must not be before createdAt",
        ));
    }

    Ok(())
}

fn check_tag(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.is_empty() => Err(ValidationError::new(
            field,
            v,
            "must not be empty when present",
        )),
        Some(v) if v.chars().any(char::is_whitespace) => Err(ValidationError::new(
            field,
            v,
            "must not contain whitespace",
        )),
        _ => Ok(()),
    }
}

/// Validate a whole list, stopping at the first invalid record
///
/// Besides the per-record checks, `id` and `fqdn` must be unique.
pub fn validate_hosts(hosts: &[HostRecord]) -> Result<(), ValidationError> {
    let now = now_millis();
    let mut ids = HashSet::new();
    let mut fqdns = HashSet::new();

    for (i, host) in hosts.iter().enumerate() {
        let prefix = format!("hosts[{i}]");
        validate_host_at(host, now).map_err(|e| e.within(&prefix))?;

        if !ids.insert(host.id) {
            return Err(ValidationError::new(
                format!("{prefix}.id"),
                host.id.to_string(),
                "duplicate id",
            ));
        }
        if !fqdns.insert(host.fqdn.as_str()) {
            return Err(ValidationError::new(
                format!("{prefix}.fqdn"),
                host.fqdn.as_str(),
                "duplicate fqdn",
            ));
        }
    }

    tracing::debug!("Validated {} hosts", hosts.len());
    Ok(())
}
