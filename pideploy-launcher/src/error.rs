use std::path::PathBuf;

use thiserror::Error;

use pideploy_core::ProcessError;

/// Error surface for regeneration, GUI launch, and service management.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A UI or resource compiler ran and reported failure.
    #[error("{tool} failed on {input} (exit code {exit_code}){}", detail(.stderr))]
    RegenerationFailed {
        tool: String,
        input: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    /// A UI or resource compiler could not be run to completion.
    #[error("could not regenerate {input}: {source}")]
    RegenerationTool {
        input: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// The GUI process could not be started.
    #[error("could not start GUI: {0}")]
    Spawn(#[source] ProcessError),

    /// `kill` could not be run against a recorded GUI pid.
    #[error("could not signal pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: ProcessError,
    },

    #[error("systemd error: {0}")]
    Service(String),

    #[error("systemctl could not run: {0}")]
    ServiceTool(#[source] ProcessError),
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::RegenerationFailed { .. } => 3,
            LaunchError::RegenerationTool { source, .. } => match source {
                ProcessError::Timeout { .. } => 124,
                err if err.is_not_found() => 127,
                _ => 3,
            },
            LaunchError::Spawn(err)
            | LaunchError::ServiceTool(err)
            | LaunchError::Signal { source: err, .. } => {
                if matches!(err, ProcessError::Timeout { .. }) {
                    124
                } else if err.is_not_found() {
                    127
                } else {
                    1
                }
            }
            _ => 1,
        }
    }
}

fn detail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LaunchError {
    LaunchError::Io {
        path: path.into(),
        source,
    }
}
