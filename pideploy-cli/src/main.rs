//! pideploy: sync a PyQt GUI to a Raspberry Pi and relaunch it.
//!
//! # Usage
//!
//! ```text
//! pideploy sync [--force-ui-gen] [--source DIR] [--host H] [--user U] [--dest PATH]
//!               [--dry-run] [--json]
//! pideploy launch [--skip-ui-gen] [--detach] [--app-dir DIR]
//! pideploy stop
//! pideploy logs [--lines N] [--stderr-only]
//! pideploy service install|uninstall|status [--print]
//! pideploy config show|path
//! ```

mod commands;
mod exit;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigCommand, launch::LaunchArgs, logs::LogsArgs, service::ServiceCommand,
    sync::SyncArgs,
};
use pideploy_core::Config;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pideploy",
    version,
    about = "Mirror a PyQt GUI to a device, regenerate UI modules when needed, and launch it",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ~/.pideploy/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror the source tree to the device and start the GUI there.
    Sync(SyncArgs),

    /// Regenerate UI modules (unless skipped) and start the GUI on this machine.
    Launch(LaunchArgs),

    /// Stop the GUI started by a detached launch.
    Stop,

    /// Print recent lines of the detached GUI's logs.
    Logs(LogsArgs),

    /// Manage the systemd unit that starts the GUI at boot.
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },

    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(exit::exit_code(&err));
        }
    }
}

/// Dispatch a subcommand; `Ok` carries the process exit code.
fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Sync(args) => args.run(config),
        Commands::Launch(args) => args.run(config),
        Commands::Stop => commands::stop::run(&config),
        Commands::Logs(args) => args.run(),
        Commands::Service { command } => commands::service::run(command, config),
        Commands::Config { command } => commands::config::run(command, &config),
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let config = pideploy_core::config::load(explicit).context("failed to load configuration")?;
    if let Some(path) = &config.loaded_from {
        tracing::debug!(path = %path.display(), "configuration loaded");
    }
    Ok(config)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}
