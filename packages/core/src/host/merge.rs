//! Field-level merge of host records
//!
//! Merging is patch-style: whatever the incoming record carries overwrites
//! the existing record, whatever it leaves empty is kept. Identity (`id`,
//! `createdAt`) always stays with the existing record.

use chrono::{DateTime, Utc};

use super::schema::HostRecord;

/// Merge `incoming` onto `existing`, returning the updated record
///
/// `updatedAt` is stamped with `now` even when no field changed.
/// Empty `name` and `ips` count as absent, as do `None` optionals.
pub fn merge(existing: &HostRecord, incoming: &HostRecord, now: DateTime<Utc>) -> HostRecord {
    HostRecord {
        id: existing.id,
        created_at: existing.created_at,
        updated_at: now.max(existing.created_at),
        fqdn: if incoming.fqdn.is_empty() {
            existing.fqdn.clone()
        } else {
            incoming.fqdn.clone()
        },
        name: if incoming.name.is_empty() {
            existing.name.clone()
        } else {
            incoming.name.clone()
        },
        ips: if incoming.ips.is_empty() {
            existing.ips.clone()
        } else {
            incoming.ips.clone()
        },
        enabled: incoming.enabled,
        user: incoming.user.clone().or_else(|| existing.user.clone()),
        group: incoming.group.clone().or_else(|| existing.group.clone()),
        ssh_server_version: incoming
            .ssh_server_version
            .clone()
            .or_else(|| existing.ssh_server_version.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::schema::now_millis;
    use chrono::Duration;

    #[test]
    fn test_merge_is_additive() {
        let existing =
            HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]).with_user("bob");
        let incoming =
            HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]).with_group("ops");

        let merged = merge(&existing, &incoming, now_millis());
        assert_eq!(merged.user.as_deref(), Some("bob"));
        assert_eq!(merged.group.as_deref(), Some("ops"));
        assert_eq!(merged.fqdn, "a.example.com");
    }

    #[test]
    fn test_merge_keeps_identity() {
        let existing = HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]);
        let incoming = HostRecord::new("a2", "a.example.com", vec!["10.0.0.2".into()]);

        let later = existing.created_at + Duration::seconds(30);
        let merged = merge(&existing, &incoming, later);

        assert_eq!(merged.id, existing.id);
        assert_eq!(merged.created_at, existing.created_at);
        assert_eq!(merged.updated_at, later);
        assert_eq!(merged.name, "a2");
        assert_eq!(merged.ips, vec!["10.0.0.2".to_string()]);
    }

    #[test]
    fn test_merge_keeps_fields_incoming_leaves_empty() {
        let existing = HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()])
            .with_ssh_server_version("SSH-2.0-OpenSSH_9.6");
        let mut incoming = HostRecord::new("", "a.example.com", vec![]);
        incoming.enabled = false;

        let merged = merge(&existing, &incoming, now_millis());
        assert_eq!(merged.name, "a");
        assert_eq!(merged.ips, existing.ips);
        assert_eq!(
            merged.ssh_server_version.as_deref(),
            Some("SSH-2.0-OpenSSH_9.6")
        );
        assert!(!merged.enabled);
    }

    #[test]
    fn test_merge_stamps_even_without_changes() {
        let existing = HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]);
        let later = existing.updated_at + Duration::milliseconds(5);

        let merged = merge(&existing, &existing, later);
        assert_eq!(merged.updated_at, later);
        assert_eq!(
            HostRecord {
                updated_at: existing.updated_at,
                ..merged
            },
            existing
        );
    }
}
