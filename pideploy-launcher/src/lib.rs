//! The Remote Launcher: regenerate UI modules when asked, then start the
//! GUI with an explicit environment. Also owns the GUI's pid file, its log
//! files, and the systemd unit that starts it at boot.

mod error;
pub mod instance;
pub mod launch;
pub mod log_rotation;
pub mod pipeline;
pub mod regenerate;
pub mod systemd;

pub use error::LaunchError;
pub use instance::StopOutcome;
pub use launch::{
    GuiProcessLauncher, LaunchEnv, LaunchMode, LaunchSpec, LaunchStatus, ProcessLauncher,
};
pub use pipeline::{LaunchRequest, LaunchRun};
pub use regenerate::{regenerate, GeneratedModule, PyQtTools, Regenerator};
pub use systemd::{
    generate_unit, install as install_service, status as service_status,
    uninstall as uninstall_service, Systemctl, UnitSpec,
};
