// SPDX-License-Identifier: MIT

//! The supervisor control loop: staggering, CPU admission, reaping, drain,
//! and shutdown, implemented as a single dedicated tokio task per
//! spec.md §4.4 and §9's "process-wide singleton → explicit value" note.

use crate::error::EngineError;
use crate::worker::{Worker, WorkerStatus};
use plotfleet_core::{JobStatus, SupervisorConfig, WorkerConfig, WorkerName};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Where logs for mock/real jobs land; spec.md §4.3 fixes this to `/tmp`.
const JOB_LOG_DIR: &str = "/tmp";

/// `Supervisor::inspect()`'s coarse pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Stopped,
    Draining,
    Working,
}

impl Pipeline {
    pub fn name(&self) -> &'static str {
        match self {
            Pipeline::Stopped => "stopped",
            Pipeline::Draining => "draining",
            Pipeline::Working => "working",
        }
    }
}

/// Wire shape for `Supervisor::inspect`, matching spec.md §4.4.
#[derive(Debug, Serialize)]
pub struct SupervisorStatus {
    pub pipeline: String,
    pub num_workers: usize,
    pub active_jobs: usize,
    pub cpu_count: u32,
    pub used_cpu_count: u32,
}

/// The single control-loop agent over all workers.
///
/// Only this loop ever spawns or reaps jobs (spec.md §3's supervisor
/// invariant); everything else — the API layer, tests — only reads
/// snapshots via `inspect`/`get_status` or issues commands via
/// `run`/`drain`/`abort`/`ensure_shutdown`.
pub struct Supervisor {
    config: SupervisorConfig,
    workers: Vec<Arc<Worker>>,
    history: Mutex<Vec<JobStatus>>,
    draining: AtomicBool,
    shutting_down: AtomicBool,
    started: AtomicBool,
    cpu_count: u32,
    control_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Supervisor {
    /// Build the supervisor and its workers from parsed `--worker
    /// WORKSPACE:DESTINATION` specs. Does not start the control loop —
    /// callers run the chiabox readiness probe first (if needed) and then
    /// call `run()`.
    pub fn new(
        config: SupervisorConfig,
        worker_specs: Vec<(PathBuf, PathBuf)>,
        forward_concurrency: u32,
        is_mock: bool,
        cpu_count: u32,
    ) -> Self {
        let workers = worker_specs
            .into_iter()
            .enumerate()
            .map(|(i, (workspace, destination))| {
                let name = WorkerName::new(format!("worker{}", i + 1));
                Arc::new(Worker::new(
                    name,
                    WorkerConfig {
                        workspace,
                        destination,
                        forward_concurrency,
                        is_mock,
                    },
                ))
            })
            .collect();

        Self {
            config,
            workers,
            history: Mutex::new(Vec::new()),
            draining: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
            started: AtomicBool::new(false),
            cpu_count: cpu_count.max(1),
            control_handle: Mutex::new(None),
        }
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Whether any configured worker is non-mock — callers use this to
    /// decide whether the chiabox readiness probe (spec.md §4.4 "pre-run
    /// check") is required at all.
    pub fn any_worker_is_real(&self) -> bool {
        self.workers.iter().any(|w| !w.is_mock())
    }

    /// Idempotent start (spec.md §4.4's `run()`). If the control loop has
    /// never started, launches it. If it has started and is draining,
    /// clears `draining` (resume). If `shutting_down`, does nothing — per
    /// SPEC_FULL.md §11, a second `run()` after the loop already exists and
    /// is not draining is also a no-op.
    #[allow(clippy::expect_used)]
    pub fn run(self: &Arc<Self>) {
        if self.shutting_down.load(Ordering::SeqCst) {
            return;
        }

        if !self.started.swap(true, Ordering::SeqCst) {
            let supervisor = Arc::clone(self);
            let handle = tokio::spawn(async move { supervisor.control_loop().await });
            // `control_handle` is only ever written here (at most once,
            // guarded by `started`'s swap) or taken by `ensure_shutdown`.
            *self.control_handle.try_lock().expect("no concurrent writer") = Some(handle);
            return;
        }

        self.draining.store(false, Ordering::SeqCst);
    }

    /// New jobs stop being admitted; running jobs finish naturally
    /// (spec.md §4.4 `drain()`).
    pub fn drain(&self) {
        self.draining.store(true, Ordering::SeqCst);
    }

    /// Locate the worker whose active job has `target_job_name` and abort
    /// it forcefully (spec.md §4.4 `abort()`).
    pub async fn abort(&self, target_job_name: &str) -> Result<(), EngineError> {
        for worker in &self.workers {
            if worker.active_job_name().await.as_deref() == Some(target_job_name) {
                worker.abort_job().await;
                return Ok(());
            }
        }
        Err(EngineError::JobNotFound(target_job_name.into()))
    }

    /// Forceful full shutdown: flips `shutting_down`, then waits for the
    /// control loop to notice (next tick), shut down every worker, and
    /// exit (spec.md §4.4 `ensure_shutdown()`).
    pub async fn ensure_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        let handle = self.control_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        } else {
            // The loop never started; nothing to join, but workers may
            // still have jobs if a caller spawned one out of band (tests).
            for worker in &self.workers {
                worker.ensure_shutdown().await;
            }
        }
    }

    /// A consistent snapshot of supervisor-wide state (spec.md §4.4
    /// `inspect()`).
    pub async fn inspect(&self) -> SupervisorStatus {
        let mut active_jobs = 0usize;
        let mut used_cpu_count = 0u32;
        for worker in &self.workers {
            if !worker.is_idle().await {
                active_jobs += 1;
            }
            used_cpu_count += worker.used_cpu_count().await;
        }

        let pipeline = if !self.started.load(Ordering::SeqCst)
            || (self.draining.load(Ordering::SeqCst) && active_jobs == 0)
        {
            Pipeline::Stopped
        } else if self.draining.load(Ordering::SeqCst) && active_jobs > 0 {
            Pipeline::Draining
        } else {
            Pipeline::Working
        };

        SupervisorStatus {
            pipeline: pipeline.name().to_string(),
            num_workers: self.workers.len(),
            active_jobs,
            cpu_count: self.cpu_count,
            used_cpu_count,
        }
    }

    /// Active jobs first (in worker order), then history in termination
    /// order (spec.md §4.4 `get_status()`).
    pub async fn get_status(&self) -> Vec<JobStatus> {
        let now = SystemTime::now();
        let mut out = Vec::new();
        for worker in &self.workers {
            if let Some(status) = worker.active_job_status(now).await {
                out.push(status);
            }
        }
        out.extend(self.history.lock().await.iter().cloned());
        out
    }

    async fn control_loop(self: Arc<Self>) {
        loop {
            if self.shutting_down.load(Ordering::SeqCst) {
                for worker in &self.workers {
                    worker.ensure_shutdown().await;
                }
                return;
            }

            self.tick(SystemTime::now()).await;

            tokio::time::sleep(self.config.tick_period).await;
        }
    }

    /// One control-loop iteration: staggering check, admission & spawn (at
    /// most one job), then reap. Split out from `control_loop` so tests can
    /// drive individual ticks deterministically instead of racing the real
    /// 1.6s sleep.
    async fn tick(&self, now: SystemTime) {
        let mut youngest: Option<SystemTime> = None;
        for worker in &self.workers {
            if let Some(started_at) = worker.active_job_started_at().await {
                youngest = youngest_of(youngest, started_at);
            }
        }
        let can_spawn = stagger_allows_spawn(now, youngest, self.config.staggering);

        if !self.draining.load(Ordering::SeqCst) && can_spawn {
            let mut used_cpu = 0u32;
            for worker in &self.workers {
                used_cpu += worker.used_cpu_count().await;
            }
            let free_cpu = self.cpu_count.saturating_sub(used_cpu);

            for worker in &self.workers {
                if !worker.is_idle().await {
                    continue;
                }
                if worker.forward_concurrency() <= free_cpu {
                    let _ = worker
                        .spawn_job(
                            self.config.farm_key.clone(),
                            self.config.pool_key.clone(),
                            PathBuf::from(JOB_LOG_DIR),
                            now,
                        )
                        .await;
                    break;
                }
            }
        }

        let mut history = self.history.lock().await;
        for worker in &self.workers {
            worker.reap_if_terminal(now, &mut history).await;
        }
    }

}

fn youngest_of(current: Option<SystemTime>, candidate: SystemTime) -> Option<SystemTime> {
    match current {
        Some(current) if current >= candidate => Some(current),
        _ => Some(candidate),
    }
}

/// Pure staggering decision (spec.md §4.4 step 2): a spawn is allowed once
/// more than `staggering` has elapsed since the youngest active job started,
/// or immediately if no job is active (sentinel epoch in spec terms).
fn stagger_allows_spawn(
    now: SystemTime,
    youngest_active_start: Option<SystemTime>,
    staggering: std::time::Duration,
) -> bool {
    match youngest_active_start {
        None => true,
        Some(youngest) => now.duration_since(youngest).unwrap_or_default() > staggering,
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
