//! sshconfig CLI - Keep a host registry and project it into ~/.ssh/config
//!
//! This module contains the CLI implementation used by the binary.

mod commands;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use sshconfig_core::config::{expand_home, get_database_path, get_home_dir, get_ssh_config_path};
use sshconfig_core::{
    Config, ConfigError, HostError, SshConfigError, get_version_long, load_config,
    load_config_from,
};
use tracing_subscriber::EnvFilter;

use commands::RunContext;

/// Keep a registry of SSH hosts and project it into ~/.ssh/config
#[derive(Parser, Debug)]
#[command(name = "sshconfig")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep a registry of SSH hosts and project it into ~/.ssh/config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry database (default: ~/.sshconfig.json)
    #[arg(short = 'D', long, global = true, value_name = "FILE")]
    database: Option<PathBuf>,

    /// SSH config to regenerate (default: ~/.ssh/config)
    #[arg(short = 's', long, global = true, value_name = "FILE")]
    sshcfg: Option<PathBuf>,

    /// Do not touch the ssh config
    #[arg(long, global = true, conflicts_with = "sshcfg")]
    no_sshcfg: bool,

    /// User to tag discovered hosts with and to filter by
    #[arg(short = 'U', long, global = true)]
    user: Option<String>,

    /// Group to tag discovered hosts with and to filter by
    #[arg(short = 'G', long, global = true)]
    group: Option<String>,

    /// Add a User line to every generated host block
    #[arg(short = 'Z', long, global = true)]
    set_user: bool,

    /// Settings file (default: ~/.config/sshconfig/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve host names and add them to the registry
    Discover(commands::DiscoverArgs),
    /// Re-resolve and probe registered hosts
    Update(commands::UpdateArgs),
    /// Import hosts from a registry document
    Import(commands::ImportArgs),
    /// Export registry entries as a document
    Export(commands::ExportArgs),
    /// List registered hosts
    List(commands::ListArgs),
    /// Regenerate the ssh config from the registry
    Sync(commands::SyncArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    tracing::debug!("sshconfig {}", get_version_long());

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            display_config_error(&e);
            std::process::exit(1);
        }
    };

    let ctx = build_context(&cli, &settings)?;
    tracing::debug!("Registry: {}", ctx.database.display());
    if let Some(path) = &ctx.ssh_config {
        tracing::debug!("SSH config: {}", path.display());
    }

    let result = match &cli.command {
        Commands::Discover(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_discover(args, &ctx))
        }
        Commands::Update(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::cmd_update(args, &ctx))
        }
        Commands::Import(args) => commands::cmd_import(args, &ctx),
        Commands::Export(args) => commands::cmd_export(args, &ctx),
        Commands::List(args) => commands::cmd_list(args, &ctx),
        Commands::Sync(args) => commands::cmd_sync(args, &ctx),
    };

    if let Err(e) = &result {
        if display_file_error(e) {
            std::process::exit(1);
        }
    }
    result
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise the level follows the `-v` count.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Load settings from `--config` if given, otherwise from the default path
fn load_settings(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
}

/// Resolve paths and options: flag, then settings file, then default
fn build_context(cli: &Cli, settings: &Config) -> Result<RunContext> {
    let home = get_home_dir();
    let resolve = |flag: &Option<PathBuf>, setting: &Option<PathBuf>, default: Option<PathBuf>| {
        flag.clone()
            .or_else(|| setting.as_deref().map(|p| expand_home(p, home.as_deref())))
            .or(default)
    };

    let database = resolve(&cli.database, &settings.database, get_database_path())
        .ok_or_else(|| anyhow!("Could not determine the registry path, use --database"))?;

    let ssh_config = if cli.no_sshcfg {
        None
    } else {
        Some(
            resolve(&cli.sshcfg, &settings.ssh_config, get_ssh_config_path())
                .ok_or_else(|| anyhow!("Could not determine the ssh config path, use --sshcfg"))?,
        )
    };

    Ok(RunContext {
        database,
        ssh_config,
        user: cli.user.clone(),
        group: cli.group.clone(),
        set_user: cli.set_user || settings.set_user,
        batch: settings.batch_options(),
        quiet: cli.quiet,
    })
}

/// Display a rich error message for an invalid settings file
fn display_config_error(err: &ConfigError) {
    eprintln!("{} Configuration error", style("Error:").red().bold());
    eprintln!();
    eprintln!("  {}", err);
    eprintln!();
    eprintln!(
        "  {} Check the settings file for syntax errors or unknown fields.",
        style("Tip:").cyan()
    );
    eprintln!(
        "  {} Valid fields: database, ssh_config, ssh_port, probe_timeout_secs, concurrency, set_user",
        style("Tip:").cyan()
    );
}

/// Display a rich error message for registry and ssh config failures
///
/// Returns false for errors that are not about those files.
fn display_file_error(err: &anyhow::Error) -> bool {
    if let Some(host_err) = err.downcast_ref::<HostError>() {
        eprintln!("{} {}", style("Error:").red().bold(), err);
        eprintln!();
        eprintln!("  {}", host_err);
        eprintln!();
        match host_err {
            HostError::Validation(_) => eprintln!(
                "  {} Nothing was written; the previous file is unchanged.",
                style("Tip:").cyan()
            ),
            HostError::Decode { .. } => eprintln!(
                "  {} Fix the document or restore it from its .bak file.",
                style("Tip:").cyan()
            ),
            _ => {}
        }
        return true;
    }

    if let Some(ssh_err) = err.downcast_ref::<SshConfigError>() {
        eprintln!("{} {}", style("Error:").red().bold(), err);
        eprintln!();
        eprintln!("  {}", ssh_err);
        if let SshConfigError::Corrupt { .. } = ssh_err {
            eprintln!();
            eprintln!(
                "  {} Remove or repair the broken marker lines, or pass {}.",
                style("Tip:").cyan(),
                style("--no-sshcfg").green()
            );
        }
        return true;
    }

    false
}
