// SPDX-License-Identifier: MIT

use std::path::PathBuf;

/// Errors surfaced by subprocess-facing operations. Every variant maps to
/// one of spec §7's error kinds and is carried up into a job's
/// `error_message` by the engine crate.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("failed to prepare directory {path}: {source}")]
    DirectoryPrep {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clear plotting space {path}: {source}")]
    ClearWorkspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn plotter process: {0}")]
    Spawn(std::io::Error),

    #[error("upload to object storage did not terminate within {0}s")]
    UploadTimeout(u64),

    #[error("upload to object storage failed: {0}")]
    UploadFailed(String),

    #[error("chiabox container never reported running")]
    ChiaboxNotReady,
}
