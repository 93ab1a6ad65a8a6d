// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! plotfleet-engine: the Job tail agent, Worker, and Supervisor control
//! loop — the cooperating-concurrent-agents core described in spec.md §1.

pub mod error;
pub mod job;
pub mod supervisor;
pub mod worker;

pub use error::EngineError;
pub use job::Job;
pub use supervisor::{Pipeline, Supervisor, SupervisorStatus};
pub use worker::{Worker, WorkerStatus};
