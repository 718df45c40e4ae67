//! Starting the Remote Launcher on the device over ssh.

use std::time::Duration;

use pideploy_core::paths::UI_MARKER_FILE;
use pideploy_core::process::{run_command, shell_quote, CommandSpec};
use pideploy_core::RemoteTarget;

use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLaunchRequest {
    pub target: RemoteTarget,
    pub ssh_options: Vec<String>,
    /// How pideploy is invoked on the device (`pideploy`, `~/.cargo/bin/pideploy`).
    pub remote_command: String,
    pub skip_ui_gen: bool,
    pub timeout: Duration,
}

impl RemoteLaunchRequest {
    /// Shell line executed on the device.
    ///
    /// The launcher is started detached so the ssh session (and its timeout)
    /// only covers regeneration and spawning the GUI. A skip is only honoured
    /// when the device has a regeneration marker; otherwise an earlier
    /// regeneration never completed there and it runs now.
    pub fn remote_script(&self) -> String {
        let dir = shell_quote(&self.target.path.display().to_string());
        let launch = format!("{} launch --detach", self.remote_command);
        if !self.skip_ui_gen {
            return format!("cd {dir} && {launch}");
        }
        format!(
            "cd {dir} && if [ -e {marker} ]; then {launch} --skip-ui-gen; else {launch}; fi",
            marker = shell_quote(UI_MARKER_FILE),
        )
    }
}

/// Runs the Remote Launcher on the target device.
pub trait RemoteLauncher {
    fn launch(&self, request: &RemoteLaunchRequest) -> Result<(), SyncError>;
}

#[derive(Debug, Clone)]
pub struct SshRemoteLauncher {
    pub ssh: String,
}

impl Default for SshRemoteLauncher {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
        }
    }
}

impl SshRemoteLauncher {
    pub fn new(ssh: impl Into<String>) -> Self {
        Self { ssh: ssh.into() }
    }

    pub fn command(&self, request: &RemoteLaunchRequest) -> CommandSpec {
        CommandSpec::new(&self.ssh)
            .args(request.ssh_options.iter().cloned())
            .arg(request.target.login())
            .arg(request.remote_script())
    }
}

impl RemoteLauncher for SshRemoteLauncher {
    fn launch(&self, request: &RemoteLaunchRequest) -> Result<(), SyncError> {
        let spec = self.command(request);
        tracing::info!(
            remote = %request.target,
            skip_ui_gen = request.skip_ui_gen,
            "starting remote launcher"
        );
        let output = run_command(&spec, request.timeout).map_err(SyncError::RemoteTool)?;

        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::info!("remote: {line}");
        }
        if !output.success() {
            return Err(SyncError::RemoteLaunchFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("remote: {line}");
        }
        Ok(())
    }
}
