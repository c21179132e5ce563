//! sshconfig list - List registered hosts

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::{Cell, Table};
use console::style;
use sshconfig_core::HostRecord;

use super::RunContext;
use crate::output::enabled_cell;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_list(args: &ListArgs, ctx: &RunContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    let hosts = registry.export_filtered(&ctx.filter());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hosts)?);
        return Ok(());
    }

    if hosts.is_empty() {
        if !ctx.quiet {
            println!("No hosts registered.");
            println!();
            println!(
                "  {} {}",
                style("Add some with:").dim(),
                style("sshconfig discover <name>...").yellow()
            );
        }
        return Ok(());
    }

    // Names only in quiet mode (for scripting)
    if ctx.quiet {
        for host in &hosts {
            println!("{}", host.name);
        }
        return Ok(());
    }

    println!("{}", host_table(&hosts, Utc::now()));
    println!();
    println!(
        "  {} {}",
        style("Registry:").dim(),
        style(registry.path().display()).dim()
    );

    Ok(())
}

fn host_table(hosts: &[HostRecord], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Name", "FQDN", "Addresses", "User", "Group", "Enabled", "SSH", "Updated",
    ]);

    for host in hosts {
        table.add_row(vec![
            Cell::new(&host.name),
            Cell::new(&host.fqdn),
            Cell::new(host.ips.join(", ")),
            Cell::new(host.user.as_deref().unwrap_or("-")),
            Cell::new(host.group.as_deref().unwrap_or("-")),
            enabled_cell(host.enabled),
            Cell::new(host.ssh_server_version.as_deref().unwrap_or("-")),
            Cell::new(format_age(now, host.updated_at)),
        ]);
    }

    table
}

/// Age of a timestamp in whole seconds, e.g. `2h 5m ago`
fn format_age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let age = (now - then).to_std().unwrap_or_default();
    let age = Duration::from_secs(age.as_secs());
    if age.is_zero() {
        return "just now".to_string();
    }
    format!("{} ago", humantime::format_duration(age))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn format_age_rounds_to_seconds() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(
            format_age(now, now - TimeDelta::milliseconds(1500)),
            "1s ago"
        );
        assert_eq!(
            format_age(now, now - TimeDelta::minutes(125)),
            "2h 5m ago"
        );
    }

    #[test]
    fn format_age_future_is_just_now() {
        let now = Utc::now();
        assert_eq!(format_age(now, now + TimeDelta::seconds(5)), "just now");
    }

    #[test]
    fn table_lists_every_host() {
        let hosts = vec![
            HostRecord::new("a", "a.example.com", vec!["10.0.0.1".into()]),
            HostRecord::new("b", "b.example.com", vec!["10.0.0.2".into(), "fd00::2".into()])
                .disabled(),
        ];
        let rendered = host_table(&hosts, Utc::now()).to_string();
        assert!(rendered.contains("a.example.com"));
        assert!(rendered.contains("10.0.0.2, fd00::2"));
        assert!(rendered.contains("no"));
    }
}
