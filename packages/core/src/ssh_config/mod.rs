//! SSH config section synchronizer
//!
//! Rewrites the tool-owned host blocks inside `~/.ssh/config` while keeping
//! every human-authored line verbatim and in its original order. On save the
//! foreign lines come first, followed by the freshly generated blocks.

mod error;
pub mod markers;

use std::fs;
use std::path::{Path, PathBuf};

use ssh2_config::{ParseRule, SshConfig};

pub use error::SshConfigError;
pub use markers::{Marker, Partitions, begin_marker, end_marker, parse_marker, partition};

use crate::backup::move_to_backup;
use crate::host::HostRecord;

/// Which partitions to write on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Include the generated host blocks
    pub generated: bool,
    /// Include the human-authored lines
    pub foreign: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            generated: true,
            foreign: true,
        }
    }
}

/// An ssh config file split into foreign and generated lines
#[derive(Debug, Clone)]
pub struct SshConfigFile {
    path: PathBuf,
    foreign: Vec<String>,
    generated: Vec<String>,
}

impl SshConfigFile {
    /// Load and partition the ssh config
    ///
    /// A missing file is an empty document.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SshConfigError> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!("SSH config not found, starting empty: {}", path.display());
            return Ok(Self {
                path,
                foreign: Vec::new(),
                generated: Vec::new(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SshConfigError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(path, &contents)
    }

    /// Partition in-memory contents as if loaded from `path`
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self, SshConfigError> {
        let parts = partition(contents.lines().map(str::to_string))?;
        Ok(Self {
            path: path.into(),
            foreign: parts.foreign,
            generated: parts.generated,
        })
    }

    /// Path the file was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-authored lines, in original order
    pub fn foreign_lines(&self) -> &[String] {
        &self.foreign
    }

    /// Current generated lines
    pub fn generated_lines(&self) -> &[String] {
        &self.generated
    }

    /// Replace the generated partition with blocks for `hosts`
    ///
    /// Disabled hosts get no block. `user` adds a `User` line to every block.
    pub fn push_own(&mut self, hosts: &[HostRecord], user: Option<&str>) {
        self.generated = generate_entries(hosts, user);
    }

    /// Generated `Host` aliases already named by a foreign `Host` line
    ///
    /// Only literal, non-negated patterns count; wildcard blocks such as
    /// `Host *` apply to every host and are not collisions.
    pub fn foreign_alias_collisions(&self, hosts: &[HostRecord]) -> Vec<String> {
        let text = self.foreign.join("\n");
        let mut reader = text.as_bytes();

        let config = match SshConfig::default().parse(&mut reader, ParseRule::ALLOW_UNKNOWN_FIELDS)
        {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Could not parse foreign ssh config lines: {}", e);
                return Vec::new();
            }
        };

        let explicit: Vec<&str> = config
            .get_hosts()
            .iter()
            .flat_map(|host| host.pattern.iter())
            .filter(|clause| !clause.negated)
            .map(|clause| clause.pattern.as_str())
            .filter(|pattern| !pattern.contains(['*', '?']))
            .collect();

        hosts
            .iter()
            .filter(|h| h.enabled)
            .filter(|h| explicit.iter().any(|p| p.eq_ignore_ascii_case(&h.name)))
            .map(|h| h.name.clone())
            .collect()
    }

    /// Render the selected partitions, each line terminated by `\n`
    pub fn render(&self, options: SaveOptions) -> String {
        let mut out = String::new();
        let parts = [
            (options.foreign, &self.foreign),
            (options.generated, &self.generated),
        ];
        for line in parts
            .into_iter()
            .filter(|(include, _)| *include)
            .flat_map(|(_, lines)| lines.iter())
        {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Save both partitions back to the file they were loaded from
    pub fn save(&self) -> Result<(), SshConfigError> {
        self.save_to(SaveOptions::default(), &self.path)
    }

    /// Save the selected partitions to `path`
    ///
    /// The existing file is moved to its `.bak` path first. The new file
    /// keeps the permissions of the one it replaces; a brand new file gets
    /// mode 600 on Unix.
    pub fn save_to(&self, options: SaveOptions, path: &Path) -> Result<(), SshConfigError> {
        let io_err = |source| SshConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Ensure .ssh directory exists with proper permissions
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(io_err)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
                        .map_err(io_err)?;
                }
            }
        }

        let contents = self.render(options);
        let backup = move_to_backup(path).map_err(io_err)?;
        fs::write(path, contents).map_err(io_err)?;

        match &backup {
            Some(previous) => {
                let perms = fs::metadata(previous).map_err(io_err)?.permissions();
                fs::set_permissions(path, perms).map_err(io_err)?;
            }
            None => {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                        .map_err(io_err)?;
                }
            }
        }

        tracing::info!(
            "Wrote {} generated and {} foreign lines to {}",
            if options.generated { self.generated.len() } else { 0 },
            if options.foreign { self.foreign.len() } else { 0 },
            path.display()
        );
        Ok(())
    }
}

/// Generate the host blocks for all enabled hosts
pub fn generate_entries(hosts: &[HostRecord], user: Option<&str>) -> Vec<String> {
    let mut result = Vec::new();

    for host in hosts {
        let _span = tracing::debug_span!("entry", id = %host.id, name = %host.name).entered();
        if !host.enabled {
            tracing::info!("Skipping {}, disabled", host.name);
            continue;
        }

        result.push(begin_marker(&host.id));
        result.push(format!("Host {}", host.name));
        result.push(format!("\tHostname {}", host.fqdn));
        result.extend(host.ips.iter().map(|ip| format!("\tHostname {ip}")));
        if let Some(user) = user {
            result.push(format!("\tUser {user}"));
        }
        result.push(end_marker(&host.id));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::backup_path;
    use tempfile::TempDir;

    fn host(name: &str, fqdn: &str, ip: &str) -> HostRecord {
        HostRecord::new(name, fqdn, vec![ip.to_string()])
    }

    #[test]
    fn test_generate_block_layout() {
        let mut a = host("web01", "web01.example.com", "10.0.0.1");
        a.ips.push("fd00::1".into());

        let lines = generate_entries(std::slice::from_ref(&a), Some("deploy"));
        assert_eq!(
            lines,
            vec![
                begin_marker(&a.id),
                "Host web01".to_string(),
                "\tHostname web01.example.com".to_string(),
                "\tHostname 10.0.0.1".to_string(),
                "\tHostname fd00::1".to_string(),
                "\tUser deploy".to_string(),
                end_marker(&a.id),
            ]
        );
    }

    #[test]
    fn test_disabled_hosts_are_skipped() {
        let a = host("a", "a.example.com", "10.0.0.1");
        let b = host("b", "b.example.com", "10.0.0.2").disabled();

        let lines = generate_entries(&[a.clone(), b.clone()], None);
        assert!(lines.contains(&begin_marker(&a.id)));
        assert!(lines.contains(&end_marker(&a.id)));
        assert!(!lines.contains(&begin_marker(&b.id)));
        assert!(!lines.iter().any(|l| l == "Host b"));
    }

    #[test]
    fn test_push_own_replaces_generated_only() {
        let a = host("a", "a.example.com", "10.0.0.1");
        let text = format!(
            "L1\n{}\nHost old\n{}\nL2\n",
            begin_marker(&a.id),
            end_marker(&a.id)
        );
        let mut file = SshConfigFile::parse("config", &text).unwrap();
        assert_eq!(file.generated_lines().len(), 3);

        file.push_own(&[], None);
        assert!(file.generated_lines().is_empty());
        assert_eq!(file.foreign_lines(), &["L1".to_string(), "L2".to_string()]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = SshConfigFile::load(temp_dir.path().join("config")).unwrap();
        assert!(file.foreign_lines().is_empty());
        assert!(file.generated_lines().is_empty());
    }

    #[test]
    fn test_marker_round_trip_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        fs::write(&path, "L1\nL2\n").unwrap();

        let a = host("a", "a.example.com", "10.0.0.1");
        let mut file = SshConfigFile::load(&path).unwrap();
        file.push_own(std::slice::from_ref(&a), None);
        file.save().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let expected = format!(
            "L1\nL2\n{}\nHost a\n\tHostname a.example.com\n\tHostname 10.0.0.1\n{}\n",
            begin_marker(&a.id),
            end_marker(&a.id)
        );
        assert_eq!(written, expected);
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "L1\nL2\n");

        let reloaded = SshConfigFile::load(&path).unwrap();
        assert_eq!(reloaded.foreign_lines(), &["L1".to_string(), "L2".to_string()]);
        assert_eq!(reloaded.generated_lines(), file.generated_lines());
    }

    #[test]
    fn test_resync_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        fs::write(&path, "Host *\n\tForwardAgent no\n").unwrap();
        let hosts = vec![host("a", "a.example.com", "10.0.0.1")];

        for _ in 0..2 {
            let mut file = SshConfigFile::load(&path).unwrap();
            file.push_own(&hosts, None);
            file.save().unwrap();
        }

        let reloaded = SshConfigFile::load(&path).unwrap();
        assert_eq!(reloaded.foreign_lines().len(), 2);
        assert_eq!(reloaded.generated_lines().len(), 5);
    }

    #[test]
    fn test_save_to_selected_partitions() {
        let temp_dir = TempDir::new().unwrap();
        let a = host("a", "a.example.com", "10.0.0.1");
        let mut file = SshConfigFile::parse("config", "L1\n").unwrap();
        file.push_own(std::slice::from_ref(&a), None);

        let generated_only = temp_dir.path().join("generated");
        file.save_to(
            SaveOptions {
                generated: true,
                foreign: false,
            },
            &generated_only,
        )
        .unwrap();
        let text = fs::read_to_string(&generated_only).unwrap();
        assert!(text.starts_with(&begin_marker(&a.id)));
        assert!(!text.contains("L1"));

        let foreign_only = temp_dir.path().join("nested").join("foreign");
        file.save_to(
            SaveOptions {
                generated: false,
                foreign: true,
            },
            &foreign_only,
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&foreign_only).unwrap(), "L1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        SshConfigFile::load(&path).unwrap().save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_fails_to_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        let id = uuid::Uuid::new_v4();
        fs::write(&path, format!("L1\n{}\nHost a\n", begin_marker(&id))).unwrap();

        assert!(matches!(
            SshConfigFile::load(&path),
            Err(SshConfigError::Corrupt { line: 2, .. })
        ));
    }

    #[test]
    fn test_foreign_alias_collisions() {
        let file = SshConfigFile::parse(
            "config",
            "Host web01\n    HostName 192.168.1.50\n    User admin\n",
        )
        .unwrap();

        let clash = host("web01", "web01.example.com", "10.0.0.1");
        let fresh = host("db01", "db01.example.com", "10.0.0.2");
        assert_eq!(
            file.foreign_alias_collisions(&[clash, fresh]),
            vec!["web01".to_string()]
        );
    }

    #[test]
    fn test_alias_collisions_use_literal_host_patterns() {
        let file = SshConfigFile::parse(
            "config",
            "Host web01 !db01\n    User admin\n\nHost *\n    HostName %h.internal\n\nHost app?\n    Port 2222\n",
        )
        .unwrap();

        let hosts = [
            host("web01", "web01.example.com", "10.0.0.1"),
            host("db01", "db01.example.com", "10.0.0.2"),
            host("app1", "app1.example.com", "10.0.0.3"),
            host("cache01", "cache01.example.com", "10.0.0.4"),
        ];
        assert_eq!(file.foreign_alias_collisions(&hosts), vec!["web01".to_string()]);
    }
}
