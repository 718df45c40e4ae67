//! Starting the GUI process.
//!
//! The display/runtime environment is passed in explicitly through
//! [`LaunchEnv`]; nothing here reads or mutates the launcher's own
//! environment to decide what the GUI sees.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use pideploy_core::config::LaunchConfig;
use pideploy_core::process::CommandSpec;
use pideploy_core::ProcessError;
use serde::Serialize;

use crate::error::{io_err, LaunchError};
use crate::instance;

/// Fixed environment the GUI runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchEnv {
    pub display: String,
    pub xauthority: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub extra: BTreeMap<String, String>,
}

impl LaunchEnv {
    pub fn from_config(cfg: &LaunchConfig) -> Self {
        Self {
            display: cfg.display.clone(),
            xauthority: cfg.xauthority.clone(),
            runtime_dir: cfg.runtime_dir.clone(),
            extra: cfg.env.clone(),
        }
    }

    /// Variables in the order they are applied; `extra` may not override
    /// the display triple.
    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![("DISPLAY".to_string(), self.display.clone())];
        if let Some(path) = &self.xauthority {
            vars.push(("XAUTHORITY".to_string(), path.display().to_string()));
        }
        if let Some(path) = &self.runtime_dir {
            vars.push(("XDG_RUNTIME_DIR".to_string(), path.display().to_string()));
        }
        for (k, v) in &self.extra {
            if matches!(k.as_str(), "DISPLAY" | "XAUTHORITY" | "XDG_RUNTIME_DIR") {
                tracing::warn!(key = %k, "ignoring override of display environment");
                continue;
            }
            vars.push((k.clone(), v.clone()));
        }
        vars
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Wait for the GUI and report its exit status.
    Foreground,
    /// Spawn into its own process group with output appended to log files.
    Detached { stdout_log: PathBuf, stderr_log: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub app_dir: PathBuf,
    pub interpreter: String,
    pub entry: PathBuf,
    pub env: LaunchEnv,
    pub mode: LaunchMode,
    /// Where the running GUI's pid is kept, in either mode.
    pub pid_file: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.interpreter)
            .arg(self.entry.display().to_string())
            .current_dir(&self.app_dir);
        for (k, v) in self.env.vars() {
            spec = spec.env(k, v);
        }
        spec
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LaunchStatus {
    /// Foreground GUI finished; `-1` if killed by a signal.
    Exited { exit_code: i32 },
    Detached { pid: u32 },
}

/// Starts the GUI as an opaque subprocess.
pub trait ProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<LaunchStatus, LaunchError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GuiProcessLauncher;

impl ProcessLauncher for GuiProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<LaunchStatus, LaunchError> {
        let command_spec = spec.command();
        let mut command = command_spec.to_command();
        let spawn_err = |source| {
            LaunchError::Spawn(ProcessError::Spawn {
                program: spec.interpreter.clone(),
                source,
            })
        };

        match &spec.mode {
            LaunchMode::Foreground => {
                tracing::info!(command = %command_spec.display(), "starting GUI (foreground)");
                let mut child = command.spawn().map_err(spawn_err)?;
                let pid = child.id();
                if let Some(pid_file) = &spec.pid_file {
                    instance::record_pid(pid_file, pid)?;
                }
                let waited = child.wait().map_err(|source| {
                    LaunchError::Spawn(ProcessError::Wait {
                        program: spec.interpreter.clone(),
                        source,
                    })
                });
                if let Some(pid_file) = &spec.pid_file {
                    instance::clear_if_owned(pid_file, pid)?;
                }
                Ok(LaunchStatus::Exited {
                    exit_code: foreground_exit_code(waited?),
                })
            }
            LaunchMode::Detached {
                stdout_log,
                stderr_log,
            } => {
                command
                    .stdin(Stdio::null())
                    .stdout(open_log(stdout_log)?)
                    .stderr(open_log(stderr_log)?);
                #[cfg(unix)]
                {
                    use std::os::unix::process::CommandExt;
                    command.process_group(0);
                }
                let child = command.spawn().map_err(spawn_err)?;
                let pid = child.id();
                if let Some(pid_file) = &spec.pid_file {
                    instance::record_pid(pid_file, pid)?;
                }
                tracing::info!(pid, command = %command_spec.display(), "started GUI (detached)");
                Ok(LaunchStatus::Detached { pid })
            }
        }
    }
}

/// Exit code of a foreground GUI. SIGTERM is how a newer launch (or
/// `pideploy stop`) ends it, so that counts as a clean exit and a service
/// manager does not restart it; other signals report `-1`.
fn foreground_exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(SIGTERM) {
            tracing::info!("GUI stopped by SIGTERM");
            return 0;
        }
    }
    -1
}

#[cfg(unix)]
const SIGTERM: i32 = 15;

fn open_log(path: &Path) -> Result<std::fs::File, LaunchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))
}
