//! Change classification and the regeneration decision.
//!
//! [`decide`] is pure: no filesystem, no processes. The Sync Trigger feeds it
//! the [`SyncOutcome`] derived from a [`TransferReport`] by [`summarize`].

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;
use crate::types::{ChangeFlag, RegenerationDecision, SyncOutcome, TransferReport};

/// Default UI-definition file pattern.
pub const DEFAULT_UI_PATTERN: &str = "*.ui";

/// Compiled UI-definition file patterns.
#[derive(Debug, Clone)]
pub struct UiMatcher {
    set: GlobSet,
}

impl UiMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ConfigError::Pattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            source,
        })?;
        Ok(Self { set })
    }

    /// Match against the full relative path, then the bare file name.
    pub fn is_match(&self, path: &Path) -> bool {
        if self.set.is_match(path) {
            return true;
        }
        path.file_name()
            .map(|name| self.set.is_match(Path::new(name)))
            .unwrap_or(false)
    }

    /// Changed, non-directory entries of `report` that match.
    pub fn count_changed(&self, report: &TransferReport) -> usize {
        report
            .iter()
            .filter(|e| !e.is_dir && e.flag != ChangeFlag::Unchanged)
            .filter(|e| self.is_match(&e.path))
            .count()
    }
}

impl Default for UiMatcher {
    fn default() -> Self {
        // A single literal pattern always compiles.
        Self::new(&[DEFAULT_UI_PATTERN]).unwrap_or_else(|_| Self {
            set: GlobSet::empty(),
        })
    }
}

/// Build the [`SyncOutcome`] for a transfer that exited with `exit_code`.
pub fn summarize(report: &TransferReport, exit_code: i32, matcher: &UiMatcher) -> SyncOutcome {
    SyncOutcome {
        success: exit_code == 0,
        exit_code,
        ui_files_changed: matcher.count_changed(report),
        destination_created: report.destination_created(),
    }
}

/// Regenerate iff forced, any UI file changed, or this is the first deploy.
pub fn decide(outcome: &SyncOutcome, force: bool) -> RegenerationDecision {
    if force || outcome.ui_files_changed > 0 || outcome.destination_created {
        RegenerationDecision::Regenerate
    } else {
        RegenerationDecision::Skip
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::types::TransferEntry;

    fn report(entries: &[(&str, ChangeFlag)]) -> TransferReport {
        entries
            .iter()
            .map(|(p, f)| TransferEntry::file(*p, *f))
            .collect()
    }

    fn outcome(ui_files_changed: usize) -> SyncOutcome {
        SyncOutcome {
            success: true,
            exit_code: 0,
            ui_files_changed,
            destination_created: false,
        }
    }

    #[test]
    fn ui_change_among_others_regenerates() {
        let r = report(&[
            ("main.py", ChangeFlag::Updated),
            ("mainWin.ui", ChangeFlag::Updated),
        ]);
        let o = summarize(&r, 0, &UiMatcher::default());
        assert_eq!(o.ui_files_changed, 1);
        assert_eq!(decide(&o, false), RegenerationDecision::Regenerate);
    }

    #[test]
    fn non_ui_change_skips() {
        let r = report(&[("readme.md", ChangeFlag::Updated)]);
        let o = summarize(&r, 0, &UiMatcher::default());
        assert_eq!(o.ui_files_changed, 0);
        assert_eq!(decide(&o, false), RegenerationDecision::Skip);
    }

    #[rstest]
    #[case(0, false, RegenerationDecision::Skip)]
    #[case(0, true, RegenerationDecision::Regenerate)]
    #[case(1, false, RegenerationDecision::Regenerate)]
    #[case(1, true, RegenerationDecision::Regenerate)]
    #[case(7, false, RegenerationDecision::Regenerate)]
    fn decision_table(
        #[case] ui_files_changed: usize,
        #[case] force: bool,
        #[case] expected: RegenerationDecision,
    ) {
        assert_eq!(decide(&outcome(ui_files_changed), force), expected);
    }

    #[test]
    fn first_deploy_regenerates_without_ui_changes() {
        let mut o = outcome(0);
        o.destination_created = true;
        assert_eq!(decide(&o, false), RegenerationDecision::Regenerate);
    }

    #[test]
    fn nested_and_deleted_ui_files_count() {
        let r = report(&[
            ("ui/mainwindow.ui", ChangeFlag::Added),
            ("ui/old.ui", ChangeFlag::Deleted),
            ("ui/icons.qrc", ChangeFlag::Updated),
        ]);
        assert_eq!(UiMatcher::default().count_changed(&r), 2);
    }

    #[test]
    fn unchanged_and_directory_entries_do_not_count() {
        let mut r = report(&[("ui/mainwindow.ui", ChangeFlag::Unchanged)]);
        r.entries.push(TransferEntry::dir("weird.ui/", ChangeFlag::Added));
        assert_eq!(UiMatcher::default().count_changed(&r), 0);
    }

    #[test]
    fn custom_patterns_extend_matching() {
        let matcher = UiMatcher::new(&["*.ui", "*.qrc"]).expect("patterns");
        let r = report(&[("ui/icons.qrc", ChangeFlag::Updated)]);
        assert_eq!(matcher.count_changed(&r), 1);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = UiMatcher::new(&["ui/[unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }), "got: {err}");
        assert!(err.to_string().contains("ui/[unclosed"));
    }

    #[test]
    fn failed_transfer_outcome_is_not_success() {
        let o = summarize(&TransferReport::default(), 23, &UiMatcher::default());
        assert!(!o.success);
        assert_eq!(o.exit_code, 23);
    }
}
