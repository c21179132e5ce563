//! sshconfig export - Write registry entries as a document

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sshconfig_core::write_hosts;

use super::RunContext;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file (default: standard output)
    pub file: Option<PathBuf>,
}

/// Export the entries matching `--user` and `--group`
pub fn cmd_export(args: &ExportArgs, ctx: &RunContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    let hosts = registry.export_filtered(&ctx.filter());
    tracing::debug!("Exporting {} of {} hosts", hosts.len(), registry.len());

    // Render fully before touching the destination
    let mut document = Vec::new();
    write_hosts(&mut document, &hosts).context("Failed to export")?;

    match &args.file {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
        }
        None => {
            io::stdout()
                .lock()
                .write_all(&document)
                .context("Failed to export")?;
        }
    }

    Ok(())
}
