// SPDX-License-Identifier: MIT

//! Immutable configuration carried by jobs, workers, and the supervisor.
//!
//! These mirror the CLI surface in full (`plotfleetd`'s `--worker`,
//! `--staggering`, `--forward_concurrency`, ... flags) but live in
//! `plotfleet-core` so the engine crate can depend on the shape without
//! depending on `clap`.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration fixed at job creation time; never mutates afterward.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub plotting_space: PathBuf,
    pub destination: PathBuf,
    pub s3_bucket: String,
    pub farm_key: String,
    pub pool_key: String,
    pub forward_concurrency: u32,
    pub log_dir: PathBuf,
    pub is_mock: bool,
}

/// Configuration fixed at worker creation time (i.e. at process startup).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub workspace: PathBuf,
    pub destination: PathBuf,
    pub forward_concurrency: u32,
    pub is_mock: bool,
}

impl WorkerConfig {
    /// Parse a `WORKSPACE:DESTINATION` CLI spec into a config missing only
    /// the fields shared across all workers (`forward_concurrency`,
    /// `is_mock`), which the caller fills in from the supervisor config.
    pub fn parse_spec(spec: &str) -> Result<(PathBuf, PathBuf), String> {
        let (workspace, destination) = spec
            .split_once(':')
            .ok_or_else(|| format!("invalid --worker spec {spec:?}, expected WORKSPACE:DESTINATION"))?;
        if workspace.is_empty() || destination.is_empty() {
            return Err(format!("invalid --worker spec {spec:?}, expected WORKSPACE:DESTINATION"));
        }
        Ok((PathBuf::from(workspace), PathBuf::from(destination)))
    }
}

/// Process-wide configuration, set once at startup from CLI flags.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub farm_key: String,
    pub pool_key: String,
    pub staggering: Duration,
    pub use_chiabox: bool,
    pub port: String,
    pub tick_period: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            farm_key: String::new(),
            pool_key: String::new(),
            staggering: Duration::from_secs(600),
            use_chiabox: true,
            port: "5000".to_string(),
            tick_period: Duration::from_millis(1_600),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
