//! sshconfig update - Re-resolve and probe registered hosts

use anyhow::Result;
use clap::Args;
use console::style;
use sshconfig_core::HostRecord;
use sshconfig_core::probe::{self, HostProber, NetworkProber};

use super::{RunContext, save_registry, sync::sync_ssh_config};
use crate::output::{ProbeProgress, failure_count_style};

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Also probe disabled hosts and re-enable those that answer
    #[arg(short, long)]
    pub all: bool,
}

pub async fn cmd_update(args: &UpdateArgs, ctx: &RunContext) -> Result<()> {
    update_with(&NetworkProber::new(), args, ctx).await
}

async fn update_with<P>(prober: &P, args: &UpdateArgs, ctx: &RunContext) -> Result<()>
where
    P: HostProber + ?Sized,
{
    let mut registry = ctx.load_registry()?;

    let candidates: Vec<HostRecord> = registry
        .hosts()
        .iter()
        .filter(|h| args.all || h.enabled)
        .cloned()
        .collect();
    tracing::info!(
        "Probing {} of {} hosts",
        candidates.len(),
        registry.len()
    );

    let progress = ProbeProgress::start("Probing", ctx.quiet);
    let refreshed = probe::refresh(prober, &candidates, &ctx.batch, Some(progress.sink())).await;
    let tally = progress.finish().await;

    registry.merge_update(refreshed);
    save_registry(&registry)?;

    if !ctx.quiet {
        println!(
            "{} Probed {} hosts: {} reachable, {} disabled",
            style("\u{2713}").green(),
            candidates.len(),
            tally.ok,
            failure_count_style(tally.failed)
        );
    }

    sync_ssh_config(ctx, &registry)
}
