//! Pid file for the detached GUI so a relaunch (or `pideploy stop`) can end
//! the previous instance.

use std::fs;
use std::path::Path;
use std::time::Duration;

use pideploy_core::process::{run_command, CommandSpec};

use crate::error::{io_err, LaunchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRecorded,
    /// A pid was recorded but the process is already gone.
    NotRunning { pid: u32 },
    Stopped { pid: u32 },
}

pub fn record_pid(path: &Path, pid: u32) -> Result<(), LaunchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    fs::write(path, format!("{pid}\n")).map_err(|e| io_err(path, e))
}

/// Recorded pid, if any. An unreadable or garbled file counts as none, and
/// so does `0`: `kill 0` would signal our own process group.
pub fn read_pid(path: &Path) -> Option<u32> {
    let raw = fs::read_to_string(path).ok()?;
    match raw.trim().parse() {
        Ok(pid) if pid > 0 => Some(pid),
        _ => {
            tracing::warn!(path = %path.display(), "ignoring malformed pid file");
            None
        }
    }
}

/// Remove the pid file if it still names `pid`. A newer launch may already
/// have replaced it.
pub fn clear_if_owned(path: &Path, pid: u32) -> Result<(), LaunchError> {
    if read_pid(path) != Some(pid) {
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

fn signal(pid: u32, sig: &str, timeout: Duration) -> Result<bool, LaunchError> {
    let spec = CommandSpec::new("kill").arg(sig).arg(pid.to_string());
    let output =
        run_command(&spec, timeout).map_err(|source| LaunchError::Signal { pid, source })?;
    Ok(output.success())
}

pub fn is_alive(pid: u32, timeout: Duration) -> Result<bool, LaunchError> {
    signal(pid, "-0", timeout)
}

/// Send SIGTERM to the recorded GUI (if alive) and clear the pid file.
pub fn stop_recorded(pid_file: &Path, timeout: Duration) -> Result<StopOutcome, LaunchError> {
    let Some(pid) = read_pid(pid_file) else {
        return Ok(StopOutcome::NotRecorded);
    };

    let outcome = if is_alive(pid, timeout)? && signal(pid, "-TERM", timeout)? {
        tracing::info!(pid, "stopped previous GUI");
        StopOutcome::Stopped { pid }
    } else {
        tracing::debug!(pid, "recorded GUI is not running");
        StopOutcome::NotRunning { pid }
    };

    match fs::remove_file(pid_file) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(pid_file, e)),
    }
    Ok(outcome)
}
