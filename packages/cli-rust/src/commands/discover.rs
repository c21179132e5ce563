//! sshconfig discover - Add hosts to the registry by name

use anyhow::Result;
use clap::Args;
use console::style;
use sshconfig_core::probe::{self, HostProber, NetworkProber};

use super::{RunContext, save_registry, sync::sync_ssh_config};
use crate::output::{ProbeProgress, failure_count_style};

/// Arguments for the discover command
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Host names or addresses to resolve and add
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

pub async fn cmd_discover(args: &DiscoverArgs, ctx: &RunContext) -> Result<()> {
    discover_with(&NetworkProber::new(), args, ctx).await
}

async fn discover_with<P>(prober: &P, args: &DiscoverArgs, ctx: &RunContext) -> Result<()>
where
    P: HostProber + ?Sized,
{
    let mut registry = ctx.load_registry()?;

    let progress = ProbeProgress::start("Discovering", ctx.quiet);
    let found = probe::discover(
        prober,
        &args.names,
        &ctx.tags(),
        &ctx.batch,
        Some(progress.sink()),
    )
    .await;
    let tally = progress.finish().await;

    let summary = registry.merge_update(found);
    save_registry(&registry)?;

    if !ctx.quiet {
        println!(
            "{} Discovered {} hosts: {} added, {} updated, {} unresolved",
            style("\u{2713}").green(),
            tally.ok,
            summary.added,
            summary.updated,
            failure_count_style(tally.failed)
        );
    }

    sync_ssh_config(ctx, &registry)
}
