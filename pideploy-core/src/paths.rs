use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const GUI_STDOUT_LOG: &str = "gui.log";
pub const GUI_STDERR_LOG: &str = "gui-err.log";
pub const GUI_PID_FILE: &str = "gui.pid";

/// Written into the app dir once regeneration has succeeded there. A device
/// without it has never produced a complete set of generated modules.
pub const UI_MARKER_FILE: &str = ".pideploy-ui-generated";

pub fn pideploy_root(home: &Path) -> PathBuf {
    home.join(".pideploy")
}

pub fn config_path(home: &Path) -> PathBuf {
    pideploy_root(home).join(CONFIG_FILE)
}

pub fn logs_dir(home: &Path) -> PathBuf {
    pideploy_root(home).join("logs")
}

pub fn run_dir(home: &Path) -> PathBuf {
    pideploy_root(home).join("run")
}

pub fn gui_stdout_log_path(home: &Path) -> PathBuf {
    logs_dir(home).join(GUI_STDOUT_LOG)
}

pub fn gui_stderr_log_path(home: &Path) -> PathBuf {
    logs_dir(home).join(GUI_STDERR_LOG)
}

pub fn gui_pid_path(home: &Path) -> PathBuf {
    run_dir(home).join(GUI_PID_FILE)
}

pub fn ui_marker_path(app_dir: &Path) -> PathBuf {
    app_dir.join(UI_MARKER_FILE)
}
