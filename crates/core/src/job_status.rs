// SPDX-License-Identifier: MIT

//! Immutable snapshot of a job at a moment in time, and its wire payload.

use crate::name::JobName;
use crate::stage::{JobState, Stage};
use crate::time_fmt::format_age;
use serde::Serialize;
use std::time::Duration;

/// One completed phase's duration, recorded in the order phases finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDetail {
    pub stage: Stage,
    pub duration: Duration,
}

/// Value-type snapshot of a `Job`, produced by `Job::inspect`.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub job_name: JobName,
    pub time_elapsed: Duration,
    pub stage: Stage,
    pub state: JobState,
    pub stage_details: Vec<StageDetail>,
    pub progress: f64,
    /// Human-readable failure detail. Empty unless `state == Fail`. Not part
    /// of the wire payload (spec.md's documented `JobStatus` JSON shape has
    /// no such field) but useful for supervisor reap logging and tests.
    pub error_message: String,
    /// Whether a `Fail` outcome was caused by `ensure_shutdown`/`abort_job`
    /// rather than a runtime timeout or other internal failure (SPEC_FULL.md
    /// §11's resolution of the shared-error-message open question). Also not
    /// part of the wire payload.
    pub aborted: bool,
}

/// Wire shape for a single stage detail entry.
#[derive(Debug, Serialize)]
pub struct StageDetailPayload {
    pub stage: String,
    pub time_consumption: String,
}

/// Wire shape of `JobStatus`, matching the control API's JSON contract.
#[derive(Debug, Serialize)]
pub struct JobStatusPayload {
    pub name: String,
    pub age: String,
    pub stage: String,
    #[serde(rename = "stageDetails")]
    pub stage_details: Vec<StageDetailPayload>,
    pub progress: String,
}

impl JobStatus {
    /// Convert this snapshot into its JSON-serializable wire payload.
    ///
    /// When the job is no longer `ONGOING` the `stage` field carries the
    /// terminal state name (`FAIL` / `SUCCESS`) instead of the phase name —
    /// the state, not the last phase reached, is what a caller wants to see
    /// first.
    pub fn to_payload(&self) -> JobStatusPayload {
        let stage = if self.state == JobState::Ongoing {
            self.stage.name().to_string()
        } else {
            self.state.name().to_string()
        };
        JobStatusPayload {
            name: self.job_name.as_str().to_string(),
            age: format_age(self.time_elapsed),
            stage,
            stage_details: self
                .stage_details
                .iter()
                .map(|d| StageDetailPayload {
                    stage: d.stage.name().to_string(),
                    time_consumption: format_age(d.duration),
                })
                .collect(),
            progress: format!("{:.2} %", self.progress),
        }
    }
}

#[cfg(test)]
#[path = "job_status_tests.rs"]
mod tests;
