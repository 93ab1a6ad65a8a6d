// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! plotfleet-proc: subprocess-facing adapters. Everything in this crate
//! talks to the outside world — spawning the plotter, probing `chiabox`,
//! running the S3 upload — so the engine crate can stay free of process
//! and filesystem concerns beyond what the `Plotter` capability exposes.

pub mod error;
pub mod plotter;
pub mod readiness;
pub mod subprocess;
pub mod upload;

pub use error::ProcError;
pub use plotter::{prepare_directories, Plotter, SpawnedPlotter};
pub use readiness::wait_for_chiabox;
pub use subprocess::run_with_timeout;
pub use upload::upload;
