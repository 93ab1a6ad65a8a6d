// SPDX-License-Identifier: MIT

//! Startup-only readiness probe for the `chiabox` container.

use crate::error::ProcError;
use std::time::Duration;
use tokio::process::Command;

const PROBE_ATTEMPTS: u32 = 20;
const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Whether a `docker inspect -f '{{.State.Status}}' chiabox` stdout capture
/// indicates the container is up. Split out from the polling loop so the
/// parsing rule is independently testable without shelling out to docker.
fn is_running(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).trim() == "running"
}

/// Poll `docker inspect -f '{{.State.Status}}' chiabox` up to
/// [`PROBE_ATTEMPTS`] times, one second apart, until it reports `running`.
///
/// Only called when at least one worker is non-mock. Failure here is fatal
/// to the whole process (spec §5, "startup-only timeout that aborts the
/// whole process on failure").
pub async fn wait_for_chiabox() -> Result<(), ProcError> {
    for attempt in 1..=PROBE_ATTEMPTS {
        let output = Command::new("docker")
            .arg("inspect")
            .arg("-f")
            .arg("{{.State.Status}}")
            .arg("chiabox")
            .output()
            .await;

        if let Ok(output) = output {
            if is_running(&output.stdout) {
                tracing::info!(attempt, "chiabox container is running");
                return Ok(());
            }
        }

        if attempt < PROBE_ATTEMPTS {
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }
    Err(ProcError::ChiaboxNotReady)
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
