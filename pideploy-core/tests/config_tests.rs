//! Config loading against a real home layout, and the decision it feeds.

use assert_fs::prelude::*;
use predicates::prelude::predicate;

use pideploy_core::config::{self, Config};
use pideploy_core::{
    decide, paths, summarize, ChangeFlag, RegenerationDecision, TransferEntry, TransferReport,
};

#[test]
fn config_file_lives_under_dot_pideploy() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".pideploy/config.yaml")
        .write_str("target:\n  host: calipi.local\n  path: /opt/cali\n")
        .expect("write");

    let cfg = config::load_at(home.path(), None).expect("load");
    assert_eq!(cfg.loaded_from.as_deref(), Some(paths::config_path(home.path()).as_path()));
    home.child(".pideploy/config.yaml").assert(predicate::path::is_file());

    let target = cfg.remote_target().expect("target");
    assert_eq!(target.rsync_spec(), "pi@calipi.local:/opt/cali/");
}

#[test]
fn explicit_path_wins_over_home() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".pideploy/config.yaml")
        .write_str("target:\n  host: from-home\n")
        .expect("write");
    let other = home.child("elsewhere.yaml");
    other.write_str("target:\n  host: from-flag\n").expect("write");

    let cfg = config::load_at(home.path(), Some(other.path())).expect("load");
    assert_eq!(cfg.target.host.as_deref(), Some("from-flag"));
}

#[test]
fn empty_file_is_all_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".pideploy/config.yaml").touch().expect("touch");

    let cfg = config::load_at(home.path(), None).expect("load");
    assert_eq!(cfg.ui, Config::default().ui);
    assert!(cfg.loaded_from.is_some());
}

#[test]
fn configured_patterns_drive_the_decision() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".pideploy/config.yaml")
        .write_str("ui:\n  patterns: ['*.ui', '*.qrc']\n")
        .expect("write");
    let cfg = config::load_at(home.path(), None).expect("load");
    let matcher = cfg.ui_matcher().expect("matcher");

    let report = TransferReport::new(vec![
        TransferEntry::file("ui/icons.qrc", ChangeFlag::Updated),
        TransferEntry::file("src/main.py", ChangeFlag::Updated),
    ]);
    let outcome = summarize(&report, 0, &matcher);
    assert_eq!(outcome.ui_files_changed, 1);
    assert_eq!(decide(&outcome, false), RegenerationDecision::Regenerate);

    let default_outcome = summarize(&report, 0, &Config::default().ui_matcher().expect("matcher"));
    assert_eq!(decide(&default_outcome, false), RegenerationDecision::Skip);
}
