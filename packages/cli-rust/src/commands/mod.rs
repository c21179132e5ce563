//! CLI command implementations
//!
//! Every command receives a [`RunContext`] holding the paths and options
//! resolved from the command line and the settings file.

mod discover;
mod export;
mod import;
mod list;
mod sync;
mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use sshconfig_core::{BatchOptions, HostFilter, HostTags, Registry};

pub use discover::{DiscoverArgs, cmd_discover};
pub use export::{ExportArgs, cmd_export};
pub use import::{ImportArgs, cmd_import};
pub use list::{ListArgs, cmd_list};
pub use sync::{SyncArgs, cmd_sync};
pub use update::{UpdateArgs, cmd_update};

/// Options shared by all commands of one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Registry database
    pub database: PathBuf,
    /// SSH config to regenerate, `None` with `--no-sshcfg`
    pub ssh_config: Option<PathBuf>,
    /// `--user` filter and tag
    pub user: Option<String>,
    /// `--group` filter and tag
    pub group: Option<String>,
    /// Add `User` lines to generated blocks
    pub set_user: bool,
    pub batch: BatchOptions,
    pub quiet: bool,
}

impl RunContext {
    /// Filter for export and list
    pub fn filter(&self) -> HostFilter {
        HostFilter {
            user: self.user.clone(),
            group: self.group.clone(),
        }
    }

    /// Tags for newly discovered hosts
    ///
    /// The user defaults to the login name.
    pub fn tags(&self) -> HostTags {
        HostTags {
            user: self
                .user
                .clone()
                .or_else(|| login_user_tag(whoami::username())),
            group: self.group.clone(),
        }
    }

    /// User written into generated blocks, if any
    pub fn ssh_user(&self) -> Option<String> {
        self.set_user
            .then(|| self.user.clone().unwrap_or_else(whoami::username))
    }

    /// Load the registry database
    pub fn load_registry(&self) -> Result<Registry> {
        Registry::load(&self.database)
            .with_context(|| format!("Failed to load registry {}", self.database.display()))
    }
}

/// Login name as a user tag; tags may not contain whitespace
fn login_user_tag(login: String) -> Option<String> {
    if login.is_empty() || login.chars().any(char::is_whitespace) {
        tracing::warn!("Not tagging hosts with login name {:?}: contains whitespace", login);
        return None;
    }
    Some(login)
}

/// Save the registry, naming the file on failure
pub(crate) fn save_registry(registry: &Registry) -> Result<()> {
    registry
        .save()
        .with_context(|| format!("Failed to save registry {}", registry.path().display()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_login_name_with_whitespace_is_not_a_tag() {
        assert_eq!(login_user_tag("alice".into()).as_deref(), Some("alice"));
        assert_eq!(login_user_tag("John Doe".into()), None);
        assert_eq!(login_user_tag(String::new()), None);
    }

    #[test]
    fn test_tags_default_user_to_login_name() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_support::context(temp_dir.path());
        assert_eq!(ctx.tags().user, login_user_tag(whoami::username()));
        assert_eq!(ctx.tags().group, None);

        let ctx = RunContext {
            user: Some("deploy".into()),
            group: Some("web".into()),
            ..ctx
        };
        assert_eq!(ctx.tags().user.as_deref(), Some("deploy"));
        assert_eq!(ctx.tags().group.as_deref(), Some("web"));
    }

    #[test]
    fn test_filter_has_no_default_user() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_support::context(temp_dir.path());
        assert_eq!(ctx.filter(), HostFilter::default());
    }

    #[test]
    fn test_ssh_user_only_with_set_user() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext {
            user: Some("deploy".into()),
            ..test_support::context(temp_dir.path())
        };
        assert_eq!(ctx.ssh_user(), None);

        let ctx = RunContext {
            set_user: true,
            ..ctx
        };
        assert_eq!(ctx.ssh_user().as_deref(), Some("deploy"));
    }
}
