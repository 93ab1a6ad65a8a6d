// SPDX-License-Identifier: MIT

//! A worker owns a `(workspace, destination)` pair and at most one active
//! job at a time.

use crate::error::EngineError;
use crate::job::Job;
use plotfleet_core::{JobConfig, JobStatus, WorkerConfig, WorkerName};
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::Mutex;

/// Wire shape for `Worker::inspect`, matching spec.md §4.3.
#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub name: String,
    pub running: String,
    #[serde(rename = "plottingSpace")]
    pub plotting_space: String,
    pub destination: String,
}

/// Owns at most one active [`Job`]. Only the supervisor's control loop ever
/// calls `spawn_job`/`abort_job`/`ensure_shutdown` — readers (the API layer,
/// the supervisor's own `inspect`) only ever call `inspect`/`used_cpu_count`,
/// so the single-writer convention from SPEC_FULL.md §7 holds even though
/// `current_job` is a plain `tokio::sync::Mutex` rather than an actor.
pub struct Worker {
    name: WorkerName,
    config: WorkerConfig,
    current_job: Mutex<Option<Job>>,
    job_index: Mutex<u64>,
}

impl Worker {
    pub fn new(name: WorkerName, config: WorkerConfig) -> Self {
        Self {
            name,
            config,
            current_job: Mutex::new(None),
            job_index: Mutex::new(0),
        }
    }

    pub fn name(&self) -> &WorkerName {
        &self.name
    }

    pub fn is_mock(&self) -> bool {
        self.config.is_mock
    }

    pub fn forward_concurrency(&self) -> u32 {
        self.config.forward_concurrency
    }

    /// The effective plotting directory for this worker: `workspace/<name>`.
    pub fn plotting_space(&self) -> PathBuf {
        self.config.workspace.join(self.name.as_str())
    }

    pub async fn is_idle(&self) -> bool {
        self.current_job.lock().await.is_none()
    }

    /// Spawn a new job on this worker. Precondition: `current_job == None`;
    /// callers (the supervisor tick) are expected to check `is_idle` first,
    /// but this also re-checks and returns an error rather than silently
    /// replacing an active job.
    pub async fn spawn_job(
        &self,
        farm_key: String,
        pool_key: String,
        log_dir: PathBuf,
        now: SystemTime,
    ) -> Result<(), EngineError> {
        let mut slot = self.current_job.lock().await;
        if slot.is_some() {
            return Err(EngineError::WorkerBusy(self.name.clone()));
        }

        let mut index = self.job_index.lock().await;
        *index += 1;
        let job_name = plotfleet_core::JobName::for_worker(&self.name, *index);

        let config = JobConfig {
            plotting_space: self.plotting_space(),
            destination: self.config.destination.clone(),
            s3_bucket: String::new(),
            farm_key,
            pool_key,
            forward_concurrency: self.config.forward_concurrency,
            log_dir,
            is_mock: self.config.is_mock,
        };

        *slot = Some(Job::spawn(job_name, config, now));
        Ok(())
    }

    /// A consistent snapshot of this worker's state, per spec.md §4.3.
    pub async fn inspect(&self) -> WorkerStatus {
        let slot = self.current_job.lock().await;
        let running = match slot.as_ref() {
            Some(job) => job.name().to_string(),
            None => "NOTHING".to_string(),
        };
        WorkerStatus {
            name: self.name.to_string(),
            running,
            plotting_space: self.plotting_space().display().to_string(),
            destination: self.config.destination.display().to_string(),
        }
    }

    /// A snapshot of the active job's status, if any.
    pub async fn active_job_status(&self, now: SystemTime) -> Option<JobStatus> {
        let slot = self.current_job.lock().await;
        slot.as_ref().map(|job| job.inspect(now))
    }

    /// `0` if idle, else delegates to the active job (spec.md §4.3).
    pub async fn used_cpu_count(&self) -> u32 {
        let slot = self.current_job.lock().await;
        match slot.as_ref() {
            Some(job) => job.used_cpu_count(self.config.forward_concurrency),
            None => 0,
        }
    }

    /// Reap the active job: await its tail agent, record its final snapshot
    /// into `history`, and clear `current_job`. No-op if idle.
    pub async fn reap_if_terminal(&self, now: SystemTime, history: &mut Vec<JobStatus>) {
        let terminal = {
            let slot = self.current_job.lock().await;
            match slot.as_ref() {
                Some(job) => job.inspect(now).state.is_terminal(),
                None => false,
            }
        };
        if !terminal {
            return;
        }

        let mut slot = self.current_job.lock().await;
        if let Some(job) = slot.take() {
            let status = job.inspect(now);
            if status.state == plotfleet_core::JobState::Fail {
                tracing::warn!(
                    worker = %self.name,
                    job = %status.job_name,
                    error = %status.error_message,
                    "job failed"
                );
            }
            job.ensure_shutdown().await;
            history.push(status);
        }
    }

    /// Delegate shutdown to the active job, if any (spec.md §4.3).
    pub async fn ensure_shutdown(&self) {
        let slot = self.current_job.lock().await;
        if let Some(job) = slot.as_ref() {
            job.ensure_shutdown().await;
        }
    }

    /// Forcefully terminate and drop the active job, if any. Unlike
    /// `reap_if_terminal`, this does not require the job to already be
    /// terminal — it is the forceful `/abort` path (spec.md §4.4).
    pub async fn abort_job(&self) -> bool {
        let mut slot = self.current_job.lock().await;
        match slot.take() {
            Some(job) => {
                job.ensure_shutdown().await;
                true
            }
            None => false,
        }
    }

    /// The active job's name, if any — used by the supervisor to route
    /// `/abort {target}` to the right worker.
    pub async fn active_job_name(&self) -> Option<String> {
        let slot = self.current_job.lock().await;
        slot.as_ref().map(|job| job.name().to_string())
    }

    /// The active job's `starting_time`, if any — used by the supervisor's
    /// staggering check.
    pub async fn active_job_started_at(&self) -> Option<SystemTime> {
        let slot = self.current_job.lock().await;
        slot.as_ref().map(|job| job.starting_time())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
