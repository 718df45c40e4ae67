//! Regenerating Python modules from Qt Designer and resource files.
//!
//! Order: the resource module first (forms import it), then one module per
//! `.ui` file in sorted order. The first failure aborts the run; modules
//! already written are left in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pideploy_core::config::UiConfig;
use pideploy_core::modules::resource_module_for_path;
use pideploy_core::process::{run_command, CommandSpec};
use pideploy_core::ModuleNames;

use crate::error::{io_err, LaunchError};

/// Opaque UI compiler tools. `Ok(())` is success, anything else failure.
pub trait Regenerator {
    fn compile_resources(&self, qrc: &Path, output: &Path) -> Result<(), LaunchError>;
    fn compile_ui(&self, ui: &Path, output: &Path) -> Result<(), LaunchError>;
}

/// `pyrcc5` / `pyuic5` from PyQt5.
#[derive(Debug, Clone)]
pub struct PyQtTools {
    pub pyuic5: String,
    pub pyrcc5: String,
    pub timeout: Duration,
}

impl PyQtTools {
    fn run(&self, tool: &str, input: &Path, output: &Path) -> Result<(), LaunchError> {
        let spec = CommandSpec::new(tool)
            .arg(input.display().to_string())
            .arg("-o")
            .arg(output.display().to_string());
        let out = run_command(&spec, self.timeout).map_err(|source| {
            LaunchError::RegenerationTool {
                input: input.to_path_buf(),
                source,
            }
        })?;
        if !out.success() {
            return Err(LaunchError::RegenerationFailed {
                tool: tool.to_string(),
                input: input.to_path_buf(),
                exit_code: out.exit_code,
                stderr: out.stderr,
            });
        }
        Ok(())
    }
}

impl Regenerator for PyQtTools {
    fn compile_resources(&self, qrc: &Path, output: &Path) -> Result<(), LaunchError> {
        self.run(&self.pyrcc5, qrc, output)
    }

    fn compile_ui(&self, ui: &Path, output: &Path) -> Result<(), LaunchError> {
        self.run(&self.pyuic5, ui, output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub source: PathBuf,
    pub module: String,
    pub output: PathBuf,
}

/// Regenerate every module under `app_dir` described by `ui`.
pub fn regenerate(
    app_dir: &Path,
    ui: &UiConfig,
    names: &ModuleNames,
    regenerator: &dyn Regenerator,
) -> Result<Vec<GeneratedModule>, LaunchError> {
    let output_dir = app_dir.join(&ui.output_dir);
    fs::create_dir_all(&output_dir).map_err(|e| io_err(&output_dir, e))?;

    let mut generated = Vec::new();

    if let Some(resource) = &ui.resource {
        let qrc = app_dir.join(resource);
        if qrc.is_file() {
            if let Some(module) = resource_module_for_path(&qrc) {
                let output = output_dir.join(format!("{module}.py"));
                regenerator.compile_resources(&qrc, &output)?;
                tracing::info!(source = %qrc.display(), %module, "resource module regenerated");
                generated.push(GeneratedModule {
                    source: qrc,
                    module,
                    output,
                });
            }
        } else {
            tracing::warn!(path = %qrc.display(), "resource file missing, skipping");
        }
    }

    for ui_file in list_ui_files(&app_dir.join(&ui.ui_dir))? {
        let Some(module) = names.module_for_path(&ui_file) else {
            continue;
        };
        let output = output_dir.join(format!("{module}.py"));
        regenerator.compile_ui(&ui_file, &output)?;
        tracing::info!(source = %ui_file.display(), %module, "ui module regenerated");
        generated.push(GeneratedModule {
            source: ui_file,
            module,
            output,
        });
    }

    Ok(generated)
}

/// `*.ui` files directly inside `dir`, sorted. A missing dir yields none.
fn list_ui_files(dir: &Path) -> Result<Vec<PathBuf>, LaunchError> {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "ui directory missing, no forms to regenerate");
        return Ok(vec![]);
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("ui"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct FakeTools {
        calls: RefCell<Vec<(String, PathBuf)>>,
        fail_on: Option<&'static str>,
    }

    impl FakeTools {
        fn record(&self, tool: &str, input: &Path, output: &Path) -> Result<(), LaunchError> {
            let name = input.file_name().unwrap().to_string_lossy().to_string();
            if self.fail_on == Some(name.as_str()) {
                return Err(LaunchError::RegenerationFailed {
                    tool: tool.to_string(),
                    input: input.to_path_buf(),
                    exit_code: 1,
                    stderr: "syntax error".to_string(),
                });
            }
            fs::write(output, "# generated\n").unwrap();
            self.calls
                .borrow_mut()
                .push((tool.to_string(), output.to_path_buf()));
            Ok(())
        }
    }

    impl Regenerator for FakeTools {
        fn compile_resources(&self, qrc: &Path, output: &Path) -> Result<(), LaunchError> {
            self.record("pyrcc5", qrc, output)
        }

        fn compile_ui(&self, ui: &Path, output: &Path) -> Result<(), LaunchError> {
            self.record("pyuic5", ui, output)
        }
    }

    fn app_with(files: &[&str]) -> TempDir {
        let app = TempDir::new().unwrap();
        for f in files {
            let path = app.path().join(f);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<ui/>").unwrap();
        }
        app
    }

    #[test]
    fn resource_first_then_sorted_forms_with_mapped_names() {
        let app = app_with(&[
            "ui/settingswindow.ui",
            "ui/mainwindow.ui",
            "ui/loadingwindow.ui",
            "ui/icons.qrc",
            "ui/readme.txt",
        ]);
        let tools = FakeTools::default();
        let names = ModuleNames::default();
        let generated =
            regenerate(app.path(), &UiConfig::default(), &names, &tools).expect("regenerate");

        let modules: Vec<&str> = generated.iter().map(|g| g.module.as_str()).collect();
        assert_eq!(modules, vec!["icons_rc", "loadingwindow", "mainWin", "caliDeviceWin"]);
        assert_eq!(tools.calls.borrow()[0].0, "pyrcc5");
        assert!(app.path().join("src/mainWin.py").exists());
        assert!(app.path().join("src/icons_rc.py").exists());
    }

    #[test]
    fn failure_aborts_remaining_forms() {
        let app = app_with(&["ui/a.ui", "ui/b.ui", "ui/c.ui"]);
        let tools = FakeTools {
            fail_on: Some("b.ui"),
            ..FakeTools::default()
        };
        let err = regenerate(app.path(), &UiConfig::default(), &ModuleNames::default(), &tools)
            .unwrap_err();

        assert!(matches!(err, LaunchError::RegenerationFailed { .. }), "got: {err}");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(tools.calls.borrow().len(), 1, "c.ui must not be compiled");
        assert!(app.path().join("src/a.py").exists());
        assert!(!app.path().join("src/c.py").exists());
    }

    #[test]
    fn missing_ui_dir_and_resource_regenerate_nothing() {
        let app = TempDir::new().unwrap();
        let tools = FakeTools::default();
        let names = ModuleNames::default();
        let generated =
            regenerate(app.path(), &UiConfig::default(), &names, &tools).expect("regenerate");
        assert!(generated.is_empty());
        assert!(tools.calls.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn pyqt_tools_report_nonzero_exit() {
        let app = app_with(&["ui/mainwindow.ui"]);
        let tools = PyQtTools {
            pyuic5: "false".to_string(),
            pyrcc5: "true".to_string(),
            timeout: Duration::from_secs(5),
        };
        let err = regenerate(app.path(), &UiConfig::default(), &ModuleNames::default(), &tools)
            .unwrap_err();
        match err {
            LaunchError::RegenerationFailed { tool, input, .. } => {
                assert_eq!(tool, "false");
                assert!(input.ends_with("mainwindow.ui"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
