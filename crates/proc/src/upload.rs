// SPDX-License-Identifier: MIT

//! Object-storage upload: the optional second subprocess a job runs after a
//! successful plot, wrapped with the same timeout discipline as
//! [`crate::run_with_timeout`].

use crate::error::ProcError;
use crate::run_with_timeout;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// `aws mv` timeout: object-storage migrations of a multi-hundred-GB plot
/// file can legitimately take close to an hour.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(3_600);

/// Run `aws mv <final_plot> <s3_bucket> --no-progress --storage-class
/// ONEZONE_IA`, enforcing [`UPLOAD_TIMEOUT`].
pub async fn upload(final_plot: &Path, s3_bucket: &str) -> Result<(), ProcError> {
    let mut cmd = Command::new("aws");
    cmd.arg("mv")
        .arg(final_plot)
        .arg(s3_bucket)
        .arg("--no-progress")
        .arg("--storage-class")
        .arg("ONEZONE_IA");

    match run_with_timeout(cmd, UPLOAD_TIMEOUT, "s3 upload").await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(ProcError::UploadFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
        Err(message) if message.contains("timed out") => {
            Err(ProcError::UploadTimeout(UPLOAD_TIMEOUT.as_secs()))
        }
        Err(message) => Err(ProcError::UploadFailed(message)),
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
