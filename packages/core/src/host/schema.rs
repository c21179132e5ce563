//! Host record schema
//!
//! Data structures for a single registry entry and the tag/filter values
//! that annotate and select entries.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the host registry
///
/// Serialized with the field names and order of the registry document
/// (`~/.sshconfig.json`). Timestamps are stored as epoch milliseconds.
/// Reading goes through [`StoredHostRecord`], which fills in missing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredHostRecord")]
pub struct HostRecord {
    /// Opaque identifier, assigned once at creation
    pub id: Uuid,

    /// Short human label, used as the `Host` alias in the ssh config
    pub name: String,

    /// Canonical resolvable name, the merge key of the registry
    pub fqdn: String,

    /// Whether the host is projected into the ssh config
    pub enabled: bool,

    /// User tag (no whitespace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Group tag (no whitespace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,

    /// Resolved addresses in resolver order
    pub ips: Vec<String>,

    /// First line of the SSH banner, without the line terminator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_server_version: Option<String>,
}

/// A registry entry as found on disk
///
/// Every field is optional. Unknown fields are ignored so newer documents
/// still load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHostRecord {
    #[serde(default)]
    id: Uuid,
    #[serde(default)]
    name: String,
    #[serde(default)]
    fqdn: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    ips: Vec<String>,
    #[serde(default)]
    ssh_server_version: Option<String>,
}

impl From<StoredHostRecord> for HostRecord {
    fn from(stored: StoredHostRecord) -> Self {
        let (created_at, updated_at) =
            sanitize_timestamps(stored.created_at, stored.updated_at, now_millis());
        Self {
            id: stored.id,
            name: stored.name,
            fqdn: stored.fqdn,
            enabled: stored.enabled,
            user: stored.user,
            group: stored.group,
            created_at,
            updated_at,
            ips: stored.ips,
            ssh_server_version: stored.ssh_server_version,
        }
    }
}

/// Fill in missing timestamps so that `created_at <= updated_at <= now` holds
/// whenever the present ones allow it
fn sanitize_timestamps(
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let created_at =
        created_at.unwrap_or_else(|| updated_at.map_or(now, |updated| updated.min(now)));
    let updated_at = updated_at.unwrap_or(created_at);
    (created_at, updated_at)
}

fn default_enabled() -> bool {
    true
}

/// Current time truncated to the millisecond precision of the document format
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Derive the default short name from the name used at discovery time
///
/// Takes the substring before the first `.`; IP literals are kept whole.
pub fn short_name(input: &str) -> String {
    if input.parse::<std::net::IpAddr>().is_ok() {
        return input.to_string();
    }
    match input.split_once('.') {
        Some((first, _)) => first.to_string(),
        None => input.to_string(),
    }
}

impl HostRecord {
    /// Create a fresh, enabled record with a new id
    pub fn new(name: impl Into<String>, fqdn: impl Into<String>, ips: Vec<String>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fqdn: fqdn.into(),
            enabled: true,
            user: None,
            group: None,
            created_at: now,
            updated_at: now,
            ips,
            ssh_server_version: None,
        }
    }

    /// Builder pattern: set user tag
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Builder pattern: set group tag
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder pattern: apply discovery tags
    pub fn with_tags(mut self, tags: &HostTags) -> Self {
        if let Some(user) = &tags.user {
            self.user = Some(user.clone());
        }
        if let Some(group) = &tags.group {
            self.group = Some(group.clone());
        }
        self
    }

    /// Builder pattern: set the SSH banner
    pub fn with_ssh_server_version(mut self, version: impl Into<String>) -> Self {
        self.ssh_server_version = Some(version.into());
        self
    }

    /// Builder pattern: mark as disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Tags applied to records created by a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTags {
    pub user: Option<String>,
    pub group: Option<String>,
}

/// Selection of registry entries by user and group
///
/// A `None` field places no constraint on that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFilter {
    pub user: Option<String>,
    pub group: Option<String>,
}

impl HostFilter {
    pub fn matches(&self, host: &HostRecord) -> bool {
        let user_ok = self
            .user
            .as_ref()
            .is_none_or(|u| host.user.as_ref() == Some(u));
        let group_ok = self
            .group
            .as_ref()
            .is_none_or(|g| host.group.as_ref() == Some(g));
        user_ok && group_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("web01.example.com"), "web01");
        assert_eq!(short_name("localhost"), "localhost");
        assert_eq!(short_name("10.1.2.3"), "10.1.2.3");
        assert_eq!(short_name("::1"), "::1");
    }

    #[test]
    fn test_new_record_defaults() {
        let host = HostRecord::new("web01", "web01.example.com", vec!["10.0.0.1".into()]);
        assert!(!host.id.is_nil());
        assert!(host.enabled);
        assert_eq!(host.created_at, host.updated_at);
        assert!(host.user.is_none());
        assert!(host.ssh_server_version.is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let host = HostRecord::new("web01", "web01.example.com", vec!["10.0.0.1".into()])
            .with_user("alice")
            .with_ssh_server_version("SSH-2.0-OpenSSH_9.6");
        let json = serde_json::to_value(&host).unwrap();

        assert!(json.get("createdAt").unwrap().is_i64());
        assert!(json.get("updatedAt").unwrap().is_i64());
        assert_eq!(json["sshServerVersion"], "SSH-2.0-OpenSSH_9.6");
        assert_eq!(json["user"], "alice");
        // Absent optionals are omitted
        assert!(json.get("group").is_none());
    }

    #[test]
    fn test_deserialize_ignores_unknown_and_fills_defaults() {
        let json = r#"{
            "id": "6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11",
            "name": "db1",
            "fqdn": "db1.example.com",
            "ips": ["192.168.1.10"],
            "group": null,
            "rack": "B4"
        }"#;
        let host: HostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(host.name, "db1");
        assert!(host.enabled);
        assert!(host.group.is_none());
        assert!(host.created_at <= host.updated_at);
    }

    #[test]
    fn test_deserialize_epoch_millis() {
        let json = r#"{
            "id": "6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11",
            "name": "db1",
            "fqdn": "db1.example.com",
            "enabled": false,
            "createdAt": 1530000000000,
            "updatedAt": 1530000001000,
            "ips": ["192.168.1.10"]
        }"#;
        let host: HostRecord = serde_json::from_str(json).unwrap();
        assert!(!host.enabled);
        assert_eq!(host.created_at.timestamp_millis(), 1_530_000_000_000);
        assert_eq!(host.updated_at.timestamp_millis(), 1_530_000_001_000);
    }

    #[test]
    fn test_missing_created_at_follows_updated_at() {
        let json = r#"{
            "id": "6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11",
            "name": "db1",
            "fqdn": "db1.example.com",
            "updatedAt": 1530000001000,
            "ips": ["10.0.0.1"]
        }"#;
        let host: HostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(host.created_at.timestamp_millis(), 1_530_000_001_000);
        assert_eq!(host.updated_at, host.created_at);
    }

    #[test]
    fn test_missing_updated_at_follows_created_at() {
        let json = r#"{
            "id": "6f1c2a0e-8a4b-4d43-9d0c-3c1d5f0e9a11",
            "name": "db1",
            "fqdn": "db1.example.com",
            "createdAt": 1530000000000,
            "ips": ["10.0.0.1"]
        }"#;
        let host: HostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(host.created_at.timestamp_millis(), 1_530_000_000_000);
        assert_eq!(host.updated_at, host.created_at);
    }

    #[test]
    fn test_sanitize_future_updated_at_keeps_order() {
        let now = now_millis();
        let future = now + chrono::Duration::hours(1);
        let (created, updated) = sanitize_timestamps(None, Some(future), now);
        assert_eq!(created, now);
        assert_eq!(updated, future);

        let (created, updated) = sanitize_timestamps(None, None, now);
        assert_eq!((created, updated), (now, now));
    }

    #[test]
    fn test_filter_matches() {
        let host = HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()])
            .with_user("bob")
            .with_group("ops");

        assert!(HostFilter::default().matches(&host));
        assert!(
            HostFilter {
                user: Some("bob".into()),
                group: Some("ops".into()),
            }
            .matches(&host)
        );
        assert!(
            !HostFilter {
                user: Some("alice".into()),
                group: None,
            }
            .matches(&host)
        );
        assert!(
            !HostFilter {
                user: None,
                group: Some("dev".into()),
            }
            .matches(&HostRecord::new("b", "b.example.com", vec![]))
        );
    }
}
