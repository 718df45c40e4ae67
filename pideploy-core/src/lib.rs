//! pideploy core library: domain types, the regeneration decision, module
//! naming, configuration, and subprocess execution shared by the Sync
//! Trigger and the Remote Launcher.
//!
//! - [`types`]: transfer report, outcome, decision, remote target
//! - [`decision`]: UI change classification and [`decide`]
//! - [`modules`]: `.ui` base name → generated module name table
//! - [`config`]: `~/.pideploy/config.yaml`
//! - [`process`]: external commands with timeouts

pub mod config;
pub mod decision;
pub mod error;
pub mod modules;
pub mod paths;
pub mod process;
pub mod types;

pub use config::Config;
pub use decision::{decide, summarize, UiMatcher};
pub use error::{ConfigError, ProcessError};
pub use modules::ModuleNames;
pub use process::{run_command, CommandOutput, CommandSpec};
pub use types::{
    ChangeFlag, RegenerationDecision, RemoteTarget, SyncOutcome, TransferEntry, TransferReport,
};
