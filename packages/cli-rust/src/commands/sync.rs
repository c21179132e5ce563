//! sshconfig sync - Regenerate the ssh config from the registry

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use sshconfig_core::{HostRecord, Registry, SaveOptions, SshConfigFile};

use super::RunContext;
use crate::output::CommandSpinner;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Write to this file instead of rewriting the ssh config in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write only the generated host blocks
    #[arg(long, conflicts_with = "foreign_only")]
    pub generated_only: bool,

    /// Write only the hand-written lines
    #[arg(long)]
    pub foreign_only: bool,
}

impl SyncArgs {
    fn save_options(&self) -> SaveOptions {
        SaveOptions {
            generated: !self.foreign_only,
            foreign: !self.generated_only,
        }
    }
}

pub fn cmd_sync(args: &SyncArgs, ctx: &RunContext) -> Result<()> {
    let Some(source) = ctx.ssh_config.as_deref() else {
        bail!("Nothing to sync: --no-sshcfg is set");
    };

    let registry = ctx.load_registry()?;
    let file = regenerate(source, registry.hosts(), ctx)?;
    let target = args.output.as_deref().unwrap_or(source);
    write_file(&file, args.save_options(), target, ctx.quiet)
}

/// Regenerate the configured ssh config after a registry change
///
/// Does nothing with `--no-sshcfg`.
pub(crate) fn sync_ssh_config(ctx: &RunContext, registry: &Registry) -> Result<()> {
    let Some(path) = ctx.ssh_config.as_deref() else {
        tracing::debug!("Not touching the ssh config, --no-sshcfg");
        return Ok(());
    };

    let file = regenerate(path, registry.hosts(), ctx)?;
    write_file(&file, SaveOptions::default(), path, ctx.quiet)
}

fn regenerate(path: &Path, hosts: &[HostRecord], ctx: &RunContext) -> Result<SshConfigFile> {
    let mut file = SshConfigFile::load(path)
        .with_context(|| format!("Failed to read ssh config {}", path.display()))?;

    for alias in file.foreign_alias_collisions(hosts) {
        tracing::warn!("Host {} is also defined outside the generated blocks", alias);
        if !ctx.quiet {
            eprintln!(
                "{} Host {} is also defined by hand in {}",
                style("Warning:").yellow().bold(),
                style(&alias).cyan(),
                path.display()
            );
        }
    }

    file.push_own(hosts, ctx.ssh_user().as_deref());
    Ok(file)
}

fn write_file(file: &SshConfigFile, options: SaveOptions, target: &Path, quiet: bool) -> Result<()> {
    let spinner = CommandSpinner::new_maybe(&format!("Writing {}...", target.display()), quiet);

    match file.save_to(options, target) {
        Ok(()) => {
            spinner.success(&format!("Wrote {}", target.display()));
            Ok(())
        }
        Err(e) => {
            spinner.fail(&format!("Failed to write {}", target.display()));
            Err(e).with_context(|| format!("Failed to write ssh config {}", target.display()))
        }
    }
}
