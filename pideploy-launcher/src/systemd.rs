use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pideploy_core::config::Config;
use pideploy_core::process::{run_command, CommandSpec};

use crate::error::{io_err, LaunchError};
use crate::launch::LaunchEnv;

/// Everything needed to render the GUI's systemd unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    pub name: String,
    pub description: String,
    pub binary: PathBuf,
    pub user: Option<String>,
    pub working_dir: PathBuf,
    pub env: LaunchEnv,
}

impl UnitSpec {
    pub fn from_config(config: &Config, app_dir: &Path) -> Self {
        Self {
            name: config.service.name.clone(),
            description: config.service.description.clone(),
            binary: config.service.binary.clone(),
            user: config.service.user.clone(),
            working_dir: app_dir.to_path_buf(),
            env: LaunchEnv::from_config(&config.launch),
        }
    }

    pub fn file_name(&self) -> String {
        unit_file_name(&self.name)
    }
}

pub fn unit_file_name(name: &str) -> String {
    if name.ends_with(".service") {
        name.to_string()
    } else {
        format!("{name}.service")
    }
}

/// Render the unit. The launcher runs in the foreground under systemd with
/// regeneration skipped; `pideploy sync` handles regeneration on deploy.
pub fn generate_unit(spec: &UnitSpec) -> String {
    let mut service = String::from("Type=simple\n");
    if let Some(user) = &spec.user {
        service.push_str(&format!("User={user}\n"));
    }
    service.push_str(&format!(
        "WorkingDirectory={}\n",
        spec.working_dir.display()
    ));
    for (key, value) in spec.env.vars() {
        service.push_str(&format!("Environment=\"{}\"\n", escape_env(&key, &value)));
    }
    service.push_str(&format!(
        "ExecStart={} launch --skip-ui-gen\n",
        spec.binary.display()
    ));
    service.push_str("Restart=on-failure\nRestartSec=5\n");

    format!(
        "[Unit]\nDescription={description}\nAfter=graphical.target\n\n\
         [Service]\n{service}\n\
         [Install]\nWantedBy=graphical.target\n",
        description = spec.description,
    )
}

fn escape_env(key: &str, value: &str) -> String {
    format!("{key}={value}")
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// systemctl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Systemctl {
    pub program: String,
    pub timeout: Duration,
}

impl Systemctl {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn run(&self, args: &[&str], ignore_failure: bool) -> Result<String, LaunchError> {
        let spec = CommandSpec::new(&self.program).args(args.iter().copied());
        let output = run_command(&spec, self.timeout).map_err(LaunchError::ServiceTool)?;
        if output.success() || ignore_failure {
            return Ok(output.stdout.trim().to_string());
        }
        Err(LaunchError::Service(format!(
            "`{}` failed (exit code {}): {} {}",
            spec.display(),
            output.exit_code,
            output.stdout.trim(),
            output.stderr.trim()
        )))
    }
}

/// Write the unit into `unit_dir`, reload systemd, then enable and start it.
pub fn install(
    unit_dir: &Path,
    spec: &UnitSpec,
    systemctl: &Systemctl,
) -> Result<PathBuf, LaunchError> {
    fs::create_dir_all(unit_dir).map_err(|e| io_err(unit_dir, e))?;
    let path = unit_dir.join(spec.file_name());
    fs::write(&path, generate_unit(spec)).map_err(|e| io_err(&path, e))?;
    tracing::info!(path = %path.display(), "unit file written");

    let unit = spec.file_name();
    systemctl.run(&["daemon-reload"], false)?;
    systemctl.run(&["enable", &unit], false)?;
    systemctl.run(&["start", &unit], false)?;
    Ok(path)
}

/// Stop and disable the unit and remove its file. Returns whether a unit
/// file was present.
pub fn uninstall(unit_dir: &Path, name: &str, systemctl: &Systemctl) -> Result<bool, LaunchError> {
    let unit = unit_file_name(name);
    let path = unit_dir.join(&unit);
    if !path.exists() {
        return Ok(false);
    }
    systemctl.run(&["disable", "--now", &unit], true)?;
    fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    systemctl.run(&["daemon-reload"], false)?;
    tracing::info!(path = %path.display(), "unit removed");
    Ok(true)
}

/// `systemctl is-active` output (`active`, `inactive`, `failed`, ...).
pub fn status(name: &str, systemctl: &Systemctl) -> Result<String, LaunchError> {
    let state = systemctl.run(&["is-active", &unit_file_name(name)], true)?;
    Ok(if state.is_empty() {
        "unknown".to_string()
    } else {
        state
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    fn spec() -> UnitSpec {
        let mut extra = BTreeMap::new();
        extra.insert("APP_DEBUG_MODE".to_string(), "0".to_string());
        UnitSpec {
            name: "cali-gui".to_string(),
            description: "Handheld calibration GUI".to_string(),
            binary: PathBuf::from("/usr/local/bin/pideploy"),
            user: Some("pi".to_string()),
            working_dir: PathBuf::from("/home/pi/caliTool"),
            env: LaunchEnv {
                display: ":0".to_string(),
                xauthority: Some(PathBuf::from("/home/pi/.Xauthority")),
                runtime_dir: None,
                extra,
            },
        }
    }

    #[test]
    fn unit_contains_exec_start_and_environment() {
        let unit = generate_unit(&spec());
        assert!(unit.contains("ExecStart=/usr/local/bin/pideploy launch --skip-ui-gen\n"));
        assert!(unit.contains("Environment=\"DISPLAY=:0\"\n"));
        assert!(unit.contains("Environment=\"XAUTHORITY=/home/pi/.Xauthority\"\n"));
        assert!(unit.contains("Environment=\"APP_DEBUG_MODE=0\"\n"));
        assert!(!unit.contains("XDG_RUNTIME_DIR"));
        assert!(unit.contains("User=pi\n"));
        assert!(unit.contains("WorkingDirectory=/home/pi/caliTool\n"));
        assert!(unit.contains("Restart=on-failure\n"));
        assert!(unit.starts_with("[Unit]\nDescription=Handheld calibration GUI\n"));
        assert!(unit.ends_with("[Install]\nWantedBy=graphical.target\n"));
    }

    #[test]
    fn env_values_are_escaped() {
        assert_eq!(escape_env("GREETING", "say \"hi\""), "GREETING=say \\\"hi\\\"");
    }

    #[test]
    fn unit_file_name_is_not_doubled() {
        assert_eq!(unit_file_name("cali-gui"), "cali-gui.service");
        assert_eq!(unit_file_name("cali-gui.service"), "cali-gui.service");
    }

    #[cfg(unix)]
    fn fake_systemctl(dir: &Path, is_active: &str) -> (Systemctl, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let log = dir.join("systemctl.log");
        let script = dir.join("systemctl");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$@\" >> '{}'\n\
                 [ \"$1\" = is-active ] && echo {is_active}\nexit 0\n",
                log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        (
            Systemctl::new(script.display().to_string(), Duration::from_secs(5)),
            log,
        )
    }

    #[cfg(unix)]
    #[test]
    fn install_then_uninstall_drives_systemctl() {
        let tmp = TempDir::new().unwrap();
        let unit_dir = tmp.path().join("units");
        let (systemctl, log) = fake_systemctl(tmp.path(), "active");

        let path = install(&unit_dir, &spec(), &systemctl).unwrap();
        assert_eq!(path, unit_dir.join("cali-gui.service"));
        assert!(fs::read_to_string(&path).unwrap().contains("ExecStart="));
        assert_eq!(status("cali-gui", &systemctl).unwrap(), "active");

        assert!(uninstall(&unit_dir, "cali-gui", &systemctl).unwrap());
        assert!(!path.exists());
        assert!(!uninstall(&unit_dir, "cali-gui", &systemctl).unwrap());

        let calls: Vec<String> = fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(
            calls,
            vec![
                "daemon-reload",
                "enable cali-gui.service",
                "start cali-gui.service",
                "is-active cali-gui.service",
                "disable --now cali-gui.service",
                "daemon-reload",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_systemctl_is_reported() {
        let tmp = TempDir::new().unwrap();
        let systemctl = Systemctl::new("false", Duration::from_secs(5));
        let err = install(&tmp.path().join("units"), &spec(), &systemctl).unwrap_err();
        assert!(matches!(err, LaunchError::Service(_)), "got: {err}");
        assert!(err.to_string().contains("daemon-reload"));
    }
}
