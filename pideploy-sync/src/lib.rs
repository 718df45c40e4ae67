//! # pideploy-sync
//!
//! The Sync Trigger: mirror the local tree to the device, classify UI
//! changes, and start the Remote Launcher with the right regeneration flag.
//!
//! Call [`pipeline::run`] with a [`Transferrer`] and a [`RemoteLauncher`];
//! production code uses [`RsyncTransferrer`] and [`SshRemoteLauncher`].

pub mod error;
pub mod itemize;
pub mod pipeline;
pub mod remote;
pub mod transfer;

pub use error::SyncError;
pub use pipeline::{SyncRequest, SyncRun};
pub use remote::{RemoteLaunchRequest, RemoteLauncher, SshRemoteLauncher};
pub use transfer::{RsyncTransferrer, TransferRequest, TransferResult, Transferrer};
