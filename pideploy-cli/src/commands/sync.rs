//! `pideploy sync`: mirror the tree to the device, decide on regeneration,
//! start the Remote Launcher.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pideploy_core::{ChangeFlag, Config, RegenerationDecision};
use pideploy_sync::transfer::generated_excludes;
use pideploy_sync::{
    pipeline, RemoteLaunchRequest, RsyncTransferrer, SshRemoteLauncher, SyncRequest, SyncRun,
    TransferRequest,
};

/// Arguments for `pideploy sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Regenerate UI modules on the device even if no .ui file changed.
    #[arg(long)]
    pub force_ui_gen: bool,

    /// Local directory to mirror (default: `source` from config).
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Device host name or address.
    #[arg(long, value_name = "H")]
    pub host: Option<String>,

    /// Login user on the device.
    #[arg(long, value_name = "U")]
    pub user: Option<String>,

    /// Destination directory on the device.
    #[arg(long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Preview the transfer and the decision; change nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, mut config: Config) -> Result<i32> {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(host) = self.host {
            config.target.host = Some(host);
        }
        if let Some(user) = self.user {
            config.target.user = Some(user);
        }
        if let Some(dest) = self.dest {
            config.target.path = dest;
        }

        let target = config
            .remote_target()
            .context("no device configured; pass --host or set target.host")?;
        let matcher = config.ui_matcher().context("invalid ui.patterns")?;

        let mut excludes = config.excludes();
        excludes.extend(generated_excludes(
            &config.source,
            &config.module_names(),
            &config.ui.output_dir,
        ));

        let request = SyncRequest {
            transfer: TransferRequest {
                source: config.source.clone(),
                target: target.clone(),
                excludes,
                ssh_options: config.target.ssh_options.clone(),
                dry_run: self.dry_run,
                timeout: config.timeouts.transfer(),
            },
            remote: RemoteLaunchRequest {
                target,
                ssh_options: config.target.ssh_options.clone(),
                remote_command: config.target.remote_command.clone(),
                skip_ui_gen: true,
                timeout: config.timeouts.remote(),
            },
            matcher,
            force_ui_gen: self.force_ui_gen,
        };

        let transferrer = RsyncTransferrer::new(&config.tools.rsync, &config.tools.ssh);
        let remote = SshRemoteLauncher::new(&config.tools.ssh);
        let run = pipeline::run(&transferrer, &remote, &request).context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&run).context("failed to render sync JSON")?
            );
        } else {
            print_run(&run);
        }
        Ok(0)
    }
}

fn print_run(run: &SyncRun) {
    let prefix = if run.dry_run { "[dry-run] " } else { "" };
    let report = &run.report;
    println!(
        "{prefix}synced to {} ({} added, {} updated, {} deleted)",
        run.target,
        report.count(ChangeFlag::Added),
        report.count(ChangeFlag::Updated),
        report.count(ChangeFlag::Deleted),
    );

    let decision = match run.decision {
        RegenerationDecision::Regenerate => "regenerate".yellow(),
        RegenerationDecision::Skip => "skip".green(),
    };
    println!(
        "{prefix}ui files changed: {}{}, ui regeneration: {decision}",
        run.outcome.ui_files_changed,
        if run.outcome.destination_created {
            " (new destination)"
        } else {
            ""
        },
    );

    if run.remote_launched {
        println!("{} launcher started on {}", "✓".green(), run.target);
    } else {
        println!("{prefix}remote launcher not started");
    }
}
