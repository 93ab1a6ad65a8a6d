// SPDX-License-Identifier: MIT

//! Generic subprocess execution helper shared by the readiness probe and
//! the upload step.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. `kill_on_drop(true)`
/// ensures the child is actually killed (not merely orphaned) if the
/// timeout elapses and `cmd.output()`'s future is dropped mid-flight.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
