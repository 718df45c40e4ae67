//! Mirroring transfer of the local tree to the device.
//!
//! [`RsyncTransferrer`] runs
//!
//! ```text
//! rsync -az --delete --itemize-changes [-n] -e "ssh <opts>" \
//!       --exclude=<pattern>... <source>/ <user>@<host>:<path>/
//! ```
//!
//! Excluded paths are neither copied nor deleted on the remote side, which is
//! what keeps the device's generated modules alive across syncs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use walkdir::{DirEntry, WalkDir};

use pideploy_core::process::{run_command, shell_quote, CommandSpec};
use pideploy_core::{ModuleNames, RemoteTarget, TransferReport};

use crate::error::{io_err, SyncError};
use crate::itemize;

/// Everything needed for one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    pub target: RemoteTarget,
    pub excludes: Vec<String>,
    pub ssh_options: Vec<String>,
    pub dry_run: bool,
    pub timeout: Duration,
}

/// A completed transfer. A non-zero `exit_code` is reported here, not as
/// an error; the pipeline decides what a failure means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub report: TransferReport,
    pub exit_code: i32,
    pub stderr: String,
}

/// Produces a [`TransferReport`] by mirroring a tree to a remote target.
pub trait Transferrer {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferResult, SyncError>;
}

/// rsync over ssh.
#[derive(Debug, Clone)]
pub struct RsyncTransferrer {
    pub rsync: String,
    pub ssh: String,
}

impl Default for RsyncTransferrer {
    fn default() -> Self {
        Self {
            rsync: "rsync".to_string(),
            ssh: "ssh".to_string(),
        }
    }
}

impl RsyncTransferrer {
    pub fn new(rsync: impl Into<String>, ssh: impl Into<String>) -> Self {
        Self {
            rsync: rsync.into(),
            ssh: ssh.into(),
        }
    }

    /// The exact command [`Transferrer::transfer`] would run.
    pub fn command(&self, request: &TransferRequest) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.rsync).args(["-az", "--delete", "--itemize-changes"]);
        if request.dry_run {
            spec = spec.arg("-n");
        }

        let remote_shell = std::iter::once(self.ssh.clone())
            .chain(request.ssh_options.iter().map(|opt| {
                if opt.contains(char::is_whitespace) {
                    shell_quote(opt)
                } else {
                    opt.clone()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ");
        spec = spec.arg("-e").arg(remote_shell);

        for pattern in &request.excludes {
            spec = spec.arg(format!("--exclude={pattern}"));
        }

        let source = request.source.display().to_string();
        let source = format!("{}/", source.trim_end_matches('/'));
        spec.arg(source).arg(request.target.rsync_spec())
    }
}

impl Transferrer for RsyncTransferrer {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferResult, SyncError> {
        if !request.source.is_dir() {
            return Err(io_err(
                &request.source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source is not a directory"),
            ));
        }

        let spec = self.command(request);
        tracing::info!(
            remote = %request.target,
            dry_run = request.dry_run,
            "starting transfer"
        );
        let output = run_command(&spec, request.timeout).map_err(SyncError::TransferTool)?;
        let report = itemize::parse(&output.stdout);
        tracing::debug!(
            exit_code = output.exit_code,
            entries = report.len(),
            "transfer finished"
        );

        Ok(TransferResult {
            report,
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

/// Exclude patterns for the generated module of every `.ui` file under
/// `source`, sorted and deduplicated.
///
/// Patterns are anchored to the transfer root at `output_dir`
/// (`/src/mainWin.py`), so a hand-written module of the same name elsewhere
/// in the tree is still mirrored.
pub fn generated_excludes(
    source: &Path,
    names: &ModuleNames,
    output_dir: &Path,
) -> Vec<String> {
    let prefix = anchored_dir(output_dir);
    let mut out = BTreeSet::new();
    let walker = WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("ui") {
            continue;
        }
        if let Some(file) = names.output_file_for_path(path) {
            out.insert(format!("{prefix}{file}"));
        }
    }
    out.into_iter().collect()
}

/// `src` → `/src/`, `.` or empty → `/`.
fn anchored_dir(dir: &Path) -> String {
    let rel = dir.to_string_lossy();
    let rel = rel.trim_start_matches("./").trim_matches('/');
    if rel.is_empty() || rel == "." {
        "/".to_string()
    } else {
        format!("/{rel}/")
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "__pycache__"
}
