// SPDX-License-Identifier: MIT

//! JSON wire shapes for the control API, beyond what `plotfleet-core`
//! already defines for `JobStatus`/`WorkerStatus`/`SupervisorStatus`.

use plotfleet_core::JobStatusPayload;
use plotfleet_engine::{SupervisorStatus, WorkerStatus};
use serde::{Deserialize, Serialize};

/// `GET/POST /status` response body (spec.md §4.5).
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: SupervisorStatus,
    pub workers: Vec<WorkerStatus>,
    pub jobs: Vec<JobStatusPayload>,
}

/// `GET/POST /start` response body.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: &'static str,
}

/// `GET/POST /drain` response body.
pub type DrainResponse = CodeResponse;

/// `POST /abort` request body.
#[derive(Debug, Deserialize)]
pub struct AbortRequest {
    pub target: String,
}

/// `POST /abort` response body.
#[derive(Debug, Serialize)]
pub struct AbortResponse {
    pub code: &'static str,
    pub target: String,
}

/// Error body returned for an `/abort` request naming an unknown job.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
