//! `pideploy stop`: end the GUI started by a detached launch.

use anyhow::{Context, Result};

use pideploy_core::{paths, Config};
use pideploy_launcher::instance::stop_recorded;
use pideploy_launcher::StopOutcome;

pub fn run(config: &Config) -> Result<i32> {
    let home = crate::home_dir()?;
    let outcome = stop_recorded(&paths::gui_pid_path(&home), config.timeouts.service())
        .context("failed to stop GUI")?;
    match outcome {
        StopOutcome::Stopped { pid } => println!("stopped GUI (pid {pid})"),
        StopOutcome::NotRunning { pid } => println!("GUI is not running (stale pid {pid})"),
        StopOutcome::NotRecorded => println!("GUI is not running"),
    }
    Ok(0)
}
