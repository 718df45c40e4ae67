//! Remote Launcher pipeline: regenerate (unless skipped) → stop previous
//! GUI → launch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pideploy_core::config::{Config, UiConfig};
use pideploy_core::{paths, ModuleNames};

use crate::error::{io_err, LaunchError};
use crate::instance;
use crate::launch::{LaunchEnv, LaunchMode, LaunchSpec, LaunchStatus, ProcessLauncher};
use crate::log_rotation::rotate_gui_logs;
use crate::regenerate::{regenerate, GeneratedModule, Regenerator};

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Root for `~/.pideploy` state (pid file, GUI logs).
    pub home: PathBuf,
    pub app_dir: PathBuf,
    pub ui: UiConfig,
    pub names: ModuleNames,
    pub skip_ui_gen: bool,
    pub detach: bool,
    pub interpreter: String,
    pub entry: PathBuf,
    pub env: LaunchEnv,
    /// Bound on each `kill` invocation used to stop the previous GUI.
    pub signal_timeout: Duration,
}

impl LaunchRequest {
    pub fn from_config(
        config: &Config,
        home: PathBuf,
        app_dir: PathBuf,
        skip_ui_gen: bool,
        detach: bool,
    ) -> Self {
        Self {
            home,
            app_dir,
            ui: config.ui.clone(),
            names: config.module_names(),
            skip_ui_gen,
            detach,
            interpreter: config.launch.interpreter.clone(),
            entry: config.launch.entry.clone(),
            env: LaunchEnv::from_config(&config.launch),
            signal_timeout: config.timeouts.service(),
        }
    }

    fn spec(&self) -> LaunchSpec {
        let mode = if self.detach {
            LaunchMode::Detached {
                stdout_log: paths::gui_stdout_log_path(&self.home),
                stderr_log: paths::gui_stderr_log_path(&self.home),
            }
        } else {
            LaunchMode::Foreground
        };
        LaunchSpec {
            app_dir: self.app_dir.clone(),
            interpreter: self.interpreter.clone(),
            entry: self.entry.clone(),
            env: self.env.clone(),
            mode,
            pid_file: Some(paths::gui_pid_path(&self.home)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchRun {
    /// Empty when regeneration was skipped.
    pub regenerated: Vec<GeneratedModule>,
    pub status: LaunchStatus,
}

/// Run the Remote Launcher. A regeneration failure returns before the GUI
/// is touched; the previous instance keeps running in that case.
///
/// The regeneration marker is cleared before compiling and written only
/// once every module compiled, so an interrupted or failed run makes the
/// next sync regenerate even if it carries no UI change.
pub fn run(
    regenerator: &dyn Regenerator,
    launcher: &dyn ProcessLauncher,
    request: &LaunchRequest,
) -> Result<LaunchRun, LaunchError> {
    let regenerated = if request.skip_ui_gen {
        tracing::info!("skipping UI regeneration");
        Vec::new()
    } else {
        let marker = paths::ui_marker_path(&request.app_dir);
        remove_marker(&marker)?;
        let generated = regenerate(&request.app_dir, &request.ui, &request.names, regenerator)?;
        fs::write(&marker, "").map_err(|e| io_err(&marker, e))?;
        tracing::info!(modules = generated.len(), "UI regeneration complete");
        generated
    };

    let pid_file = paths::gui_pid_path(&request.home);
    instance::stop_recorded(&pid_file, request.signal_timeout)?;

    if request.detach {
        rotate_gui_logs(&request.home);
    }

    let status = launcher.launch(&request.spec())?;
    if let LaunchStatus::Exited { exit_code } = status {
        if exit_code != 0 {
            tracing::warn!(exit_code, "GUI exited with failure");
        }
    }

    Ok(LaunchRun {
        regenerated,
        status,
    })
}

fn remove_marker(marker: &Path) -> Result<(), LaunchError> {
    match fs::remove_file(marker) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(marker, e)),
    }
}
