//! `pideploy launch`: the Remote Launcher, run on the device.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pideploy_core::Config;
use pideploy_launcher::pipeline;
use pideploy_launcher::{GuiProcessLauncher, LaunchRequest, LaunchStatus, PyQtTools};

use crate::exit::gui_exit_code;

/// Arguments for `pideploy launch`.
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Use the previously generated UI modules as they are.
    #[arg(long)]
    pub skip_ui_gen: bool,

    /// Start the GUI in the background with output going to ~/.pideploy/logs.
    #[arg(long)]
    pub detach: bool,

    /// Application directory (default: `launch.app_dir` from config, else cwd).
    #[arg(long, value_name = "DIR")]
    pub app_dir: Option<PathBuf>,
}

impl LaunchArgs {
    pub fn run(self, config: Config) -> Result<i32> {
        let app_dir = match self.app_dir.or_else(|| config.launch.app_dir.clone()) {
            Some(dir) => dir,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let home = crate::home_dir()?;

        let tools = PyQtTools {
            pyuic5: config.tools.pyuic5.clone(),
            pyrcc5: config.tools.pyrcc5.clone(),
            timeout: config.timeouts.regenerate(),
        };
        let request =
            LaunchRequest::from_config(&config, home, app_dir, self.skip_ui_gen, self.detach);

        let run = pipeline::run(&tools, &GuiProcessLauncher, &request).context("launch failed")?;
        match run.status {
            LaunchStatus::Detached { pid } => {
                println!("GUI started (pid {pid}, {} modules regenerated)", run.regenerated.len());
                Ok(0)
            }
            LaunchStatus::Exited { exit_code } => Ok(gui_exit_code(exit_code)),
        }
    }
}
