//! Error types for pideploy-sync.

use std::path::PathBuf;

use thiserror::Error;

use pideploy_core::{ConfigError, ProcessError};

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The transfer tool ran but exited non-zero (network, auth, disk …).
    #[error("transfer failed with exit code {exit_code}{}", stderr_suffix(.stderr))]
    TransferFailed { exit_code: i32, stderr: String },

    /// The transfer tool could not be run to completion.
    #[error("transfer could not run: {0}")]
    TransferTool(#[source] ProcessError),

    /// The remote launcher ran but exited non-zero.
    #[error("remote launch failed with exit code {exit_code}{}", stderr_suffix(.stderr))]
    RemoteLaunchFailed { exit_code: i32, stderr: String },

    #[error("remote launch could not run: {0}")]
    RemoteTool(#[source] ProcessError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// The process exit status this failure should surface as.
    ///
    /// Transfer failures mirror the transfer tool's own exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::TransferFailed { exit_code, .. } if *exit_code > 0 => *exit_code,
            SyncError::RemoteLaunchFailed { exit_code, .. } if *exit_code > 0 => *exit_code,
            SyncError::RemoteLaunchFailed { .. } => 4,
            SyncError::TransferTool(err) | SyncError::RemoteTool(err) => process_exit_code(err),
            _ => 1,
        }
    }
}

/// 124 for timeouts, 127 for a missing tool, 1 otherwise.
pub fn process_exit_code(err: &ProcessError) -> i32 {
    match err {
        ProcessError::Timeout { .. } => 124,
        err if err.is_not_found() => 127,
        _ => 1,
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
