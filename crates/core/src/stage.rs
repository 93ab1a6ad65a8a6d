// SPDX-License-Identifier: MIT

//! Plotting stage and job-state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the plotter's internal phases, plus the synthetic
/// `INITIALIZATION` and `S3_MIGRATION` stages a job passes through before
/// the first real phase and after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Initialization,
    Forward,
    Backward,
    Compression,
    WriteCheckpoint,
    S3Migration,
    End,
}

impl Stage {
    /// Map a plotter phase id (1-4) to a `Stage`. Any other id maps to `End`,
    /// matching the original plotter's own catch-all behavior.
    pub fn from_phase_id(id: u32) -> Self {
        match id {
            1 => Stage::Forward,
            2 => Stage::Backward,
            3 => Stage::Compression,
            4 => Stage::WriteCheckpoint,
            _ => Stage::End,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Initialization => "INITIALIZATION",
            Stage::Forward => "FORWARD",
            Stage::Backward => "BACKWARD",
            Stage::Compression => "COMPRESSION",
            Stage::WriteCheckpoint => "WRITE_CHECKPOINT",
            Stage::S3Migration => "S3_MIGRATION",
            Stage::End => "END",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Terminal or in-flight state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Ongoing,
    Fail,
    Success,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Ongoing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobState::Ongoing => "ONGOING",
            JobState::Fail => "FAIL",
            JobState::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
