//! YAML configuration at `~/.pideploy/config.yaml`.
//!
//! Every field has a default, so a missing file (or a partial one) is
//! valid. Command-line flags override individual values after loading.
//!
//! # API pattern
//!
//! - `load_at(home, …)`: explicit home; used in tests with `TempDir`
//! - `load(…)`: derives home from `dirs::home_dir()`, delegates to `load_at`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decision::{UiMatcher, DEFAULT_UI_PATTERN};
use crate::error::{io_err, ConfigError};
use crate::modules::ModuleNames;
use crate::paths;
use crate::types::RemoteTarget;

/// Artifacts never mirrored to the device. Generated modules are added per
/// UI file at transfer time.
pub const BASE_EXCLUDES: &[&str] = &[
    "__pycache__/",
    "*.pyc",
    ".git/",
    ".venv/",
    "*_rc.py",
    "/.pideploy-ui-generated",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    /// Local tree mirrored to the device.
    pub source: PathBuf,
    /// Extra rsync exclude patterns on top of [`BASE_EXCLUDES`].
    pub exclude: Vec<String>,
    pub ui: UiConfig,
    pub timeouts: TimeoutConfig,
    pub launch: LaunchConfig,
    pub service: ServiceConfig,
    pub tools: ToolsConfig,
    /// File this config was read from; `None` means built-in defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub user: Option<String>,
    pub host: Option<String>,
    pub path: PathBuf,
    pub ssh_options: Vec<String>,
    /// Command that runs pideploy on the device.
    pub remote_command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub patterns: Vec<String>,
    /// Directory (relative to the app dir) holding the `.ui` files.
    pub ui_dir: PathBuf,
    /// Directory (relative to the app dir) receiving generated modules.
    pub output_dir: PathBuf,
    /// Qt resource file (relative to the app dir), compiled to `<stem>_rc.py`.
    pub resource: Option<PathBuf>,
    /// `.ui` base name → module name, layered over the built-in table.
    pub modules: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub transfer_secs: u64,
    pub remote_secs: u64,
    /// Per tool invocation.
    pub regenerate_secs: u64,
    pub service_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Application root on the device; defaults to the working directory.
    pub app_dir: Option<PathBuf>,
    pub interpreter: String,
    /// Entry script relative to the app dir.
    pub entry: PathBuf,
    pub display: String,
    pub xauthority: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub description: String,
    pub unit_dir: PathBuf,
    pub user: Option<String>,
    /// pideploy binary path written into `ExecStart=`.
    pub binary: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub rsync: String,
    pub ssh: String,
    pub pyuic5: String,
    pub pyrcc5: String,
    pub systemctl: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            source: PathBuf::from("."),
            exclude: Vec::new(),
            ui: UiConfig::default(),
            timeouts: TimeoutConfig::default(),
            launch: LaunchConfig::default(),
            service: ServiceConfig::default(),
            tools: ToolsConfig::default(),
            loaded_from: None,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            user: Some("pi".to_string()),
            host: None,
            path: PathBuf::from("/home/pi/caliTool"),
            ssh_options: vec![
                "-o".to_string(),
                "BatchMode=yes".to_string(),
                "-o".to_string(),
                "ConnectTimeout=10".to_string(),
            ],
            remote_command: "pideploy".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_UI_PATTERN.to_string()],
            ui_dir: PathBuf::from("ui"),
            output_dir: PathBuf::from("src"),
            resource: Some(PathBuf::from("ui/icons.qrc")),
            modules: BTreeMap::new(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            transfer_secs: 300,
            remote_secs: 180,
            regenerate_secs: 60,
            service_secs: 30,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            app_dir: None,
            interpreter: "python3".to_string(),
            entry: PathBuf::from("src/main.py"),
            display: ":0".to_string(),
            xauthority: Some(PathBuf::from("/home/pi/.Xauthority")),
            runtime_dir: Some(PathBuf::from("/run/user/1000")),
            env: BTreeMap::new(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "cali-gui".to_string(),
            description: "Handheld calibration GUI".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            user: Some("pi".to_string()),
            binary: PathBuf::from("/usr/local/bin/pideploy"),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rsync: "rsync".to_string(),
            ssh: "ssh".to_string(),
            pyuic5: "pyuic5".to_string(),
            pyrcc5: "pyrcc5".to_string(),
            systemctl: "systemctl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

impl Config {
    /// The remote target, or [`ConfigError::MissingHost`] if none is set.
    pub fn remote_target(&self) -> Result<RemoteTarget, ConfigError> {
        let host = self
            .target
            .host
            .clone()
            .filter(|h| !h.trim().is_empty())
            .ok_or(ConfigError::MissingHost)?;
        Ok(RemoteTarget {
            user: self.target.user.clone(),
            host,
            path: self.target.path.clone(),
        })
    }

    pub fn ui_matcher(&self) -> Result<UiMatcher, ConfigError> {
        UiMatcher::new(&self.ui.patterns)
    }

    pub fn module_names(&self) -> ModuleNames {
        ModuleNames::with_overrides(&self.ui.modules)
    }

    /// [`BASE_EXCLUDES`] followed by the configured extras, deduplicated.
    pub fn excludes(&self) -> Vec<String> {
        let mut out: Vec<String> = BASE_EXCLUDES.iter().map(|s| s.to_string()).collect();
        for pattern in &self.exclude {
            if !out.contains(pattern) {
                out.push(pattern.clone());
            }
        }
        out
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl TimeoutConfig {
    pub fn transfer(&self) -> Duration {
        Duration::from_secs(self.transfer_secs)
    }

    pub fn remote(&self) -> Duration {
        Duration::from_secs(self.remote_secs)
    }

    pub fn regenerate(&self) -> Duration {
        Duration::from_secs(self.regenerate_secs)
    }

    pub fn service(&self) -> Duration {
        Duration::from_secs(self.service_secs)
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the config, preferring `explicit` over `<home>/.pideploy/config.yaml`.
///
/// A missing default file yields [`Config::default`]; a missing explicit file
/// is an error.
pub fn load_at(home: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_file(path),
        None => {
            let path = paths::config_path(home);
            if !path.exists() {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            load_file(&path)
        }
    }
}

/// `load_at` convenience wrapper.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    load_at(&home()?, explicit)
}

/// Parse a single config file.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    // An empty file is a valid "all defaults" document.
    let mut cfg: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    cfg.ui_matcher()?;
    cfg.loaded_from = Some(path.to_path_buf());
    Ok(cfg)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
