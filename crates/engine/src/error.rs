// SPDX-License-Identifier: MIT

use plotfleet_core::{JobName, WorkerName};

/// Errors from supervisor-level control operations. Per-job failures never
/// surface here — they live in `Job.state = FAIL` / `error_message` instead
/// (spec §7: per-job errors are isolated, not propagated to the caller).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("worker {0} has no active job to abort")]
    WorkerIdle(WorkerName),

    #[error("worker {0} already has an active job")]
    WorkerBusy(WorkerName),

    #[error("no active job named {0}")]
    JobNotFound(JobName),

    #[error("chiabox readiness check failed: {0}")]
    ChiaboxNotReady(#[from] plotfleet_proc::ProcError),
}
