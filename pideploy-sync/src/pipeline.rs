//! Sync Trigger pipeline: transfer → classify → decide → remote launch.
//!
//! Strictly sequential. A failed transfer returns before the remote side is
//! ever contacted.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pideploy_core::{
    decide, summarize, RegenerationDecision, SyncOutcome, TransferReport, UiMatcher,
};

use crate::error::SyncError;
use crate::remote::{RemoteLaunchRequest, RemoteLauncher};
use crate::transfer::{TransferRequest, Transferrer};

/// Inputs for one sync run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub transfer: TransferRequest,
    /// `skip_ui_gen` is overwritten from the decision.
    pub remote: RemoteLaunchRequest,
    pub matcher: UiMatcher,
    pub force_ui_gen: bool,
}

/// What happened during a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRun {
    pub started_at: DateTime<Utc>,
    pub target: String,
    pub dry_run: bool,
    pub report: TransferReport,
    pub outcome: SyncOutcome,
    pub decision: RegenerationDecision,
    pub remote_launched: bool,
    pub duration_ms: u128,
}

/// Run the Sync Trigger.
///
/// In dry-run mode the transfer only previews changes and the remote
/// launcher is not invoked.
pub fn run(
    transferrer: &dyn Transferrer,
    remote: &dyn RemoteLauncher,
    request: &SyncRequest,
) -> Result<SyncRun, SyncError> {
    let started_at = Utc::now();
    let clock = Instant::now();

    let result = transferrer.transfer(&request.transfer)?;
    let outcome = summarize(&result.report, result.exit_code, &request.matcher);
    if !outcome.success {
        tracing::error!(exit_code = outcome.exit_code, "transfer failed, not launching");
        return Err(SyncError::TransferFailed {
            exit_code: outcome.exit_code,
            stderr: result.stderr,
        });
    }

    let decision = decide(&outcome, request.force_ui_gen);
    tracing::info!(
        entries = result.report.len(),
        ui_files_changed = outcome.ui_files_changed,
        destination_created = outcome.destination_created,
        force = request.force_ui_gen,
        %decision,
        "transfer complete"
    );

    let dry_run = request.transfer.dry_run;
    if !dry_run {
        let remote_request = RemoteLaunchRequest {
            skip_ui_gen: decision.skip_regeneration(),
            ..request.remote.clone()
        };
        remote.launch(&remote_request)?;
    }

    Ok(SyncRun {
        started_at,
        target: request.transfer.target.to_string(),
        dry_run,
        report: result.report,
        outcome,
        decision,
        remote_launched: !dry_run,
        duration_ms: clock.elapsed().as_millis(),
    })
}
