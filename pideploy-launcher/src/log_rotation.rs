//! Size-based rotation of the detached GUI's log files.
//!
//! `gui.log` and `gui-err.log` are rotated before each detached launch once
//! they reach 10 MiB, keeping `gui.log.1` (newest) through `gui.log.5`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pideploy_core::paths;

pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

pub const MAX_ROTATED_FILES: usize = 5;

/// Rotate `log` if it is at least `max_bytes` long.
///
/// Returns `Ok(false)` when the file is small or absent. The live path is
/// not recreated; the next launch opens it in append mode.
pub fn rotate_if_needed(log: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes || max_files == 0 {
        return Ok(false);
    }

    let oldest = rotated_path(log, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let from = rotated_path(log, n);
        if from.exists() {
            fs::rename(&from, rotated_path(log, n + 1))?;
        }
    }
    fs::rename(log, rotated_path(log, 1))?;
    Ok(true)
}

/// Rotate both GUI logs under `home`. Failures are logged, never fatal.
pub fn rotate_gui_logs(home: &Path) {
    for log in [
        paths::gui_stdout_log_path(home),
        paths::gui_stderr_log_path(home),
    ] {
        match rotate_if_needed(&log, MAX_LOG_BYTES, MAX_ROTATED_FILES) {
            Ok(true) => tracing::info!(path = %log.display(), "gui log rotated"),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(path = %log.display(), error = %err, "gui log rotation failed")
            }
        }
    }
}

/// `gui.log` -> `gui.log.<n>`.
pub fn rotated_path(base: &Path, n: usize) -> PathBuf {
    let mut name = base.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{n}"));
    base.with_file_name(name)
}
