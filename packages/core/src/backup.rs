//! Backup of files about to be overwritten
//!
//! Before the registry document or the ssh config is rewritten, the current
//! file is renamed to `<name>.bak`, replacing any stale backup.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the file name of a backup
pub const BACKUP_SUFFIX: &str = ".bak";

/// Get the backup path for a file: `config` -> `config.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Move a file aside to its backup path
///
/// Returns the backup path, or `None` if there was nothing to back up.
pub fn move_to_backup(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.exists() {
        tracing::debug!("Does not exist, not backing up: {}", path.display());
        return Ok(None);
    }

    let backup = backup_path(path);
    if backup.exists() {
        tracing::debug!("Removing backup file in the way: {}", backup.display());
        fs::remove_file(&backup)?;
    }

    fs::rename(path, &backup)?;
    tracing::debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/home/u/.ssh/config")),
            PathBuf::from("/home/u/.ssh/config.bak")
        );
        assert_eq!(
            backup_path(Path::new("hosts.json")),
            PathBuf::from("hosts.json.bak")
        );
    }

    #[test]
    fn test_missing_file_is_not_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");

        assert_eq!(move_to_backup(&path).unwrap(), None);
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_replaces_stale_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        fs::write(&path, "current").unwrap();
        fs::write(backup_path(&path), "stale").unwrap();

        let backup = move_to_backup(&path).unwrap().unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "current");
    }
}
