//! Maps a failed command to the process exit code.

use pideploy_launcher::LaunchError;
use pideploy_sync::error::process_exit_code;
use pideploy_sync::SyncError;

use pideploy_core::ProcessError;

pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<SyncError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<LaunchError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<ProcessError>() {
            return process_exit_code(err);
        }
    }
    1
}

/// A foreground GUI killed by a signal reports `-1`; surface that as 1.
pub fn gui_exit_code(code: i32) -> i32 {
    if code < 0 {
        1
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Context;

    use super::*;

    #[test]
    fn transfer_failure_keeps_rsync_code_through_context() {
        let err: anyhow::Result<()> = Err(SyncError::TransferFailed {
            exit_code: 23,
            stderr: String::new(),
        })
        .context("sync failed");
        assert_eq!(exit_code(&err.unwrap_err()), 23);
    }

    #[test]
    fn launcher_and_process_errors_map() {
        let regen = anyhow::Error::new(LaunchError::RegenerationFailed {
            tool: "pyuic5".to_string(),
            input: "ui/mainwindow.ui".into(),
            exit_code: 1,
            stderr: String::new(),
        });
        assert_eq!(exit_code(&regen), 3);

        let timeout = anyhow::Error::new(ProcessError::Timeout {
            program: "rsync".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(exit_code(&timeout), 124);

        assert_eq!(exit_code(&anyhow::anyhow!("bad config")), 1);
    }

    #[test]
    fn signalled_gui_is_failure() {
        assert_eq!(gui_exit_code(-1), 1);
        assert_eq!(gui_exit_code(0), 0);
        assert_eq!(gui_exit_code(2), 2);
    }
}
