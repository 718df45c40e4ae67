//! Mapping from UI-definition file names to generated Python module names.
//!
//! The GUI imports its generated forms under short names (`from mainWin
//! import Ui_MainWindow`) that differ from the designer file names. Names
//! missing from the table map to themselves.

use std::collections::BTreeMap;
use std::path::Path;

/// Built-in `.ui` base name → module name entries.
pub const BUILTIN_MODULES: &[(&str, &str)] = &[
    ("mainwindow", "mainWin"),
    ("settingswindow", "caliDeviceWin"),
    ("calibrationselectwindow", "caliSelectWin"),
    ("calibrationdistortionwindow", "caliDistortionWin"),
    ("calibrationperspectivewindow", "caliPerspectiveWin"),
    ("calibrationoffsetwindow", "caliOffsetWin"),
    ("calibrationdialog", "caliDialog"),
];

/// Suffix pyrcc5 modules carry by convention (`icons.qrc` → `icons_rc`).
pub const RESOURCE_MODULE_SUFFIX: &str = "_rc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNames {
    table: BTreeMap<String, String>,
}

impl ModuleNames {
    /// The built-in table with `overrides` layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut names = Self::default();
        for (base, module) in overrides {
            names.table.insert(base.clone(), module.clone());
        }
        names
    }

    /// Module name for a `.ui` base name; identity when unmapped.
    pub fn module_for(&self, base_name: &str) -> String {
        self.table
            .get(base_name)
            .cloned()
            .unwrap_or_else(|| base_name.to_string())
    }

    /// Module name for a `.ui` file path (uses the file stem).
    pub fn module_for_path(&self, ui_file: &Path) -> Option<String> {
        let stem = ui_file.file_stem()?.to_str()?;
        Some(self.module_for(stem))
    }

    /// `<module>.py` for a `.ui` file path.
    pub fn output_file_for_path(&self, ui_file: &Path) -> Option<String> {
        self.module_for_path(ui_file).map(|m| format!("{m}.py"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for ModuleNames {
    fn default() -> Self {
        Self {
            table: BUILTIN_MODULES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// `icons.qrc` → `icons_rc`.
pub fn resource_module_for_path(qrc_file: &Path) -> Option<String> {
    let stem = qrc_file.file_stem()?.to_str()?;
    Some(format!("{stem}{RESOURCE_MODULE_SUFFIX}"))
}
