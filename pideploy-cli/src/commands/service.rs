//! `pideploy service`: systemd unit that starts the GUI at boot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use pideploy_core::Config;
use pideploy_launcher::{
    generate_unit, install_service, service_status, uninstall_service, Systemctl, UnitSpec,
};

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Write the unit, reload systemd, enable and start it.
    Install(InstallArgs),
    /// Disable and stop the unit and remove its file.
    Uninstall,
    /// Print `systemctl is-active` for the unit.
    Status,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Print the unit instead of installing it.
    #[arg(long)]
    pub print: bool,

    /// Working directory of the GUI (default: `launch.app_dir`, else `target.path`).
    #[arg(long, value_name = "DIR")]
    pub app_dir: Option<PathBuf>,
}

pub fn run(command: ServiceCommand, config: Config) -> Result<i32> {
    let systemctl = Systemctl::new(&config.tools.systemctl, config.timeouts.service());
    let unit_dir = &config.service.unit_dir;

    match command {
        ServiceCommand::Install(args) => {
            let app_dir = args
                .app_dir
                .or_else(|| config.launch.app_dir.clone())
                .unwrap_or_else(|| config.target.path.clone());
            let spec = UnitSpec::from_config(&config, &app_dir);
            if args.print {
                print!("{}", generate_unit(&spec));
                return Ok(0);
            }
            let path = install_service(unit_dir, &spec, &systemctl)
                .context("failed to install systemd unit")?;
            println!("installed systemd unit: {}", path.display());
        }
        ServiceCommand::Uninstall => {
            let removed = uninstall_service(unit_dir, &config.service.name, &systemctl)
                .context("failed to uninstall systemd unit")?;
            if removed {
                println!("uninstalled systemd unit {}", config.service.name);
            } else {
                println!("systemd unit {} is not installed", config.service.name);
            }
        }
        ServiceCommand::Status => {
            let state = service_status(&config.service.name, &systemctl)
                .context("failed to query systemd unit")?;
            println!("{}: {state}", config.service.name);
        }
    }
    Ok(0)
}
