//! Domain types for a single sync run.
//!
//! Everything here is ephemeral: a [`TransferReport`] and the derived
//! [`SyncOutcome`] are produced fresh on every invocation and never persisted.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transfer report
// ---------------------------------------------------------------------------

/// How a single path differs between the local tree and the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFlag {
    Added,
    Updated,
    Deleted,
    Unchanged,
}

impl fmt::Display for ChangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeFlag::Added => write!(f, "added"),
            ChangeFlag::Updated => write!(f, "updated"),
            ChangeFlag::Deleted => write!(f, "deleted"),
            ChangeFlag::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One per-file change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    /// Path relative to the transfer root, as reported by the transfer tool.
    pub path: PathBuf,
    pub flag: ChangeFlag,
    #[serde(default)]
    pub is_dir: bool,
}

impl TransferEntry {
    pub fn file(path: impl Into<PathBuf>, flag: ChangeFlag) -> Self {
        Self {
            path: path.into(),
            flag,
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<PathBuf>, flag: ChangeFlag) -> Self {
        Self {
            path: path.into(),
            flag,
            is_dir: true,
        }
    }

    /// `true` when this entry is the transfer root itself (`./`).
    pub fn is_root(&self) -> bool {
        self.is_dir && (self.path.as_os_str().is_empty() || self.path == PathBuf::from("."))
    }
}

/// Ordered per-file change records, in the order the transfer tool emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReport {
    pub entries: Vec<TransferEntry>,
}

impl TransferReport {
    pub fn new(entries: Vec<TransferEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferEntry> {
        self.entries.iter()
    }

    /// Number of entries carrying `flag`.
    pub fn count(&self, flag: ChangeFlag) -> usize {
        self.entries.iter().filter(|e| e.flag == flag).count()
    }

    /// `true` when the destination root did not exist before this transfer.
    pub fn destination_created(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.is_root() && e.flag == ChangeFlag::Added)
    }
}

impl FromIterator<TransferEntry> for TransferReport {
    fn from_iter<I: IntoIterator<Item = TransferEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome + decision
// ---------------------------------------------------------------------------

/// Summary of a finished transfer, as far as the regeneration decision cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub exit_code: i32,
    /// Changed entries whose path matches the UI-definition pattern.
    pub ui_files_changed: usize,
    /// The remote tree was created by this transfer (first deploy).
    #[serde(default)]
    pub destination_created: bool,
}

/// Whether the remote side must rebuild its generated UI modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegenerationDecision {
    Skip,
    Regenerate,
}

impl RegenerationDecision {
    pub fn skip_regeneration(self) -> bool {
        matches!(self, RegenerationDecision::Skip)
    }
}

impl fmt::Display for RegenerationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegenerationDecision::Skip => write!(f, "skip"),
            RegenerationDecision::Regenerate => write!(f, "regenerate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote target
// ---------------------------------------------------------------------------

/// Where the tree is mirrored to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTarget {
    pub user: Option<String>,
    pub host: String,
    pub path: PathBuf,
}

impl RemoteTarget {
    /// `user@host`, or just `host` when no user is configured.
    pub fn login(&self) -> String {
        match &self.user {
            Some(user) if !user.is_empty() => format!("{user}@{}", self.host),
            _ => self.host.clone(),
        }
    }

    /// rsync destination spec: `user@host:/path/` (trailing slash mirrors contents).
    pub fn rsync_spec(&self) -> String {
        let path = self.path.display().to_string();
        let path = path.trim_end_matches('/');
        format!("{}:{path}/", self.login())
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.login(), self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_entry_detection() {
        assert!(TransferEntry::dir("./", ChangeFlag::Added).is_root());
        assert!(TransferEntry::dir(".", ChangeFlag::Updated).is_root());
        assert!(!TransferEntry::dir("src/", ChangeFlag::Added).is_root());
        assert!(!TransferEntry::file(".", ChangeFlag::Added).is_root());
    }

    #[test]
    fn destination_created_only_for_added_root() {
        let fresh = TransferReport::new(vec![
            TransferEntry::dir("./", ChangeFlag::Added),
            TransferEntry::file("main.py", ChangeFlag::Added),
        ]);
        assert!(fresh.destination_created());

        let touched = TransferReport::new(vec![TransferEntry::dir("./", ChangeFlag::Updated)]);
        assert!(!touched.destination_created());
    }

    #[test]
    fn remote_target_specs() {
        let target = RemoteTarget {
            user: Some("pi".to_string()),
            host: "raspberrypi.local".to_string(),
            path: PathBuf::from("/home/pi/caliTool/"),
        };
        assert_eq!(target.login(), "pi@raspberrypi.local");
        assert_eq!(target.rsync_spec(), "pi@raspberrypi.local:/home/pi/caliTool/");

        let no_user = RemoteTarget {
            user: None,
            host: "pi4".to_string(),
            path: PathBuf::from("/opt/app"),
        };
        assert_eq!(no_user.rsync_spec(), "pi4:/opt/app/");
    }

    #[test]
    fn report_serde_uses_lowercase_flags() {
        let report = TransferReport::new(vec![TransferEntry::file("a.ui", ChangeFlag::Deleted)]);
        let yaml = serde_yaml::to_string(&report).expect("serialize");
        assert!(yaml.contains("deleted"), "yaml={yaml}");
    }
}
