//! `pideploy config`: inspect the effective configuration.

use anyhow::{Context, Result};
use clap::Subcommand;

use pideploy_core::{paths, Config};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as YAML (defaults filled in).
    Show,
    /// Print where the configuration is read from.
    Path,
}

pub fn run(command: ConfigCommand, config: &Config) -> Result<i32> {
    match command {
        ConfigCommand::Show => {
            print!("{}", config.to_yaml().context("failed to render configuration")?);
        }
        ConfigCommand::Path => match &config.loaded_from {
            Some(path) => println!("{}", path.display()),
            None => println!(
                "{} (not present, using defaults)",
                paths::config_path(&crate::home_dir()?).display()
            ),
        },
    }
    Ok(0)
}
