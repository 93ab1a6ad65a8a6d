// SPDX-License-Identifier: MIT

//! `plotfleetd` argument parsing (spec.md §6).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Supervise a fleet of Chia plotting jobs.
///
/// Invoked with no subcommand, `plotfleetd` starts the supervisor control
/// loop and the HTTP control surface and runs until SIGINT/SIGTERM.
#[derive(Parser, Debug)]
#[command(name = "plotfleetd", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Diagnostic tooling that does not start the supervisor.
    Logs {
        #[command(subcommand)]
        command: LogsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogsCommand {
    /// Replay an existing job log file and print its re-derived stage and
    /// progress, without re-running the job (SPEC_FULL.md §6).
    Inspect {
        /// Path to a `chiafan_plotting_*.log` file.
        path: PathBuf,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Chia farmer public key, forwarded to every job.
    #[arg(long, default_value = "")]
    pub farm_key: String,

    /// Chia pool public key, forwarded to every job.
    #[arg(long, default_value = "")]
    pub pool_key: String,

    /// A `WORKSPACE:DESTINATION` pair; repeat once per worker.
    #[arg(long = "worker", value_name = "WORKSPACE:DESTINATION")]
    pub workers: Vec<String>,

    /// Run every worker against the mock plotter instead of chiabox.
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub is_mock: bool,

    /// Port the control API binds to.
    #[arg(long, default_value = "5000")]
    pub port: String,

    /// Minimum seconds between successive job starts.
    #[arg(long, default_value_t = 600)]
    pub staggering: u64,

    /// CPU cores reserved per job while forward plotting.
    #[arg(long, default_value_t = 4)]
    pub forward_concurrency: u32,

    /// Require and probe the `chiabox` container before starting.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub use_chiabox: bool,
}

impl RunArgs {
    pub fn staggering_duration(&self) -> Duration {
        Duration::from_secs(self.staggering)
    }

    /// Parse every `--worker` spec, failing fast on the first malformed one.
    pub fn parse_worker_specs(&self) -> Result<Vec<(PathBuf, PathBuf)>, String> {
        self.workers
            .iter()
            .map(|spec| plotfleet_core::WorkerConfig::parse_spec(spec))
            .collect()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
