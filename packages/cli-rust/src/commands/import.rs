//! sshconfig import - Load hosts from a registry document

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use dialoguer::Confirm;
use sshconfig_core::{HostRecord, read_hosts};

use super::{RunContext, save_registry, sync::sync_ssh_config};

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Document to import (default: standard input)
    pub file: Option<PathBuf>,

    /// Replace the whole registry instead of merging
    #[arg(long)]
    pub replace: bool,

    /// Skip the confirmation prompt for --replace
    #[arg(short, long)]
    pub yes: bool,
}

pub fn cmd_import(args: &ImportArgs, ctx: &RunContext) -> Result<()> {
    let hosts = match &args.file {
        Some(path) => {
            tracing::debug!("Importing from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_hosts(file, &path.display().to_string())?
        }
        None => {
            tracing::debug!("Importing from standard input");
            read_hosts(io::stdin().lock(), "<stdin>")?
        }
    };

    import_hosts(hosts, args, ctx)
}

fn import_hosts(hosts: Vec<HostRecord>, args: &ImportArgs, ctx: &RunContext) -> Result<()> {
    let mut registry = ctx.load_registry()?;
    tracing::debug!("Updating from {} imported hosts", hosts.len());

    let count = hosts.len();
    if args.replace {
        if !args.yes && !confirm_replace(registry.len(), count, args.file.is_none())? {
            if !ctx.quiet {
                println!("Import cancelled.");
            }
            return Ok(());
        }
        registry.replace(hosts);
    } else {
        let summary = registry.merge_update(hosts);
        if !ctx.quiet {
            println!(
                "{} Imported {} hosts: {} added, {} updated",
                style("\u{2713}").green(),
                count,
                summary.added,
                summary.updated
            );
        }
    }

    save_registry(&registry)?;

    if args.replace && !ctx.quiet {
        println!(
            "{} Replaced registry with {} hosts",
            style("\u{2713}").green(),
            count
        );
    }

    sync_ssh_config(ctx, &registry)
}

fn confirm_replace(current: usize, incoming: usize, from_stdin: bool) -> Result<bool> {
    // The document already consumed stdin, so no prompt can be answered there
    if from_stdin || !io::stdin().is_terminal() {
        bail!("--replace without a terminal requires --yes");
    }

    Confirm::new()
        .with_prompt(format!(
            "Replace {current} registered hosts with {incoming} imported hosts?"
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use sshconfig_core::{Registry, write_hosts};
    use std::fs;
    use tempfile::TempDir;

    fn write_document(path: &std::path::Path, hosts: &[HostRecord]) {
        write_hosts(File::create(path).unwrap(), hosts).unwrap();
    }

    #[test]
    fn import_merges_by_fqdn() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(temp_dir.path());

        let existing = HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()])
            .with_user("bob");
        let mut registry = Registry::empty(&ctx.database);
        registry.replace(vec![existing.clone()]);
        registry.save().unwrap();

        let doc = temp_dir.path().join("import.json");
        write_document(
            &doc,
            &[
                HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]).with_group("ops"),
                HostRecord::new("b", "b.example.com", vec!["10.0.0.2".into()]),
            ],
        );

        let args = ImportArgs {
            file: Some(doc),
            replace: false,
            yes: false,
        };
        cmd_import(&args, &ctx).unwrap();

        let registry = ctx.load_registry().unwrap();
        assert_eq!(registry.len(), 2);
        let a = registry.find("a.example.com").unwrap();
        assert_eq!(a.id, existing.id);
        assert_eq!(a.user.as_deref(), Some("bob"));
        assert_eq!(a.group.as_deref(), Some("ops"));
        assert!(ctx.ssh_config.unwrap().exists());
    }

    #[test]
    fn import_replace_with_yes() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(temp_dir.path());

        let mut registry = Registry::empty(&ctx.database);
        registry.replace(vec![HostRecord::new(
            "old",
            "old.example.com",
            vec!["10.0.0.9".into()],
        )]);
        registry.save().unwrap();

        let doc = temp_dir.path().join("import.json");
        write_document(
            &doc,
            &[HostRecord::new("new", "new.example.com", vec!["10.0.0.1".into()])],
        );

        let args = ImportArgs {
            file: Some(doc),
            replace: true,
            yes: true,
        };
        cmd_import(&args, &ctx).unwrap();

        let registry = ctx.load_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.find("new.example.com").is_some());
    }

    #[test]
    fn import_invalid_document_leaves_registry_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context(temp_dir.path());

        let mut registry = Registry::empty(&ctx.database);
        registry.replace(vec![HostRecord::new(
            "a",
            "a.example.com",
            vec!["10.0.0.1".into()],
        )]);
        registry.save().unwrap();
        let before = fs::read(&ctx.database).unwrap();

        let doc = temp_dir.path().join("import.json");
        let mut bad = HostRecord::new("b", "b.example.com", vec!["10.0.0.2".into()]);
        bad.ips = vec!["not-an-ip".into()];
        fs::write(&doc, serde_json::to_string(&vec![bad]).unwrap()).unwrap();

        let args = ImportArgs {
            file: Some(doc),
            replace: false,
            yes: false,
        };
        assert!(cmd_import(&args, &ctx).is_err());
        assert_eq!(fs::read(&ctx.database).unwrap(), before);
    }

    #[test]
    fn replace_from_stdin_requires_yes() {
        assert!(confirm_replace(1, 1, true).is_err());
    }
}
