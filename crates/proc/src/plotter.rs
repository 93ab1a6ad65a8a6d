// SPDX-License-Identifier: MIT

//! The `Plotter` capability: a sum type over "mock" and "real chiabox"
//! plotter invocations, collapsed behind a single `spawn` operation so a
//! `Job` never has to branch on which variant it holds (spec §9's
//! "dynamic subprocess polymorphism" design note).

use crate::error::ProcError;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, ChildStdout, Command};

/// One plotter invocation, either the deterministic mock stand-in or a real
/// `chia plots create` run inside the `chiabox` container.
#[derive(Debug, Clone)]
pub enum Plotter {
    Mock {
        destination: PathBuf,
    },
    Chiabox {
        plotting_space: PathBuf,
        destination: PathBuf,
        farm_key: String,
        pool_key: String,
        forward_concurrency: u32,
    },
}

/// A live plotter subprocess: its stdout stream plus a `Child` handle
/// serving as both the wait and kill capability.
pub struct SpawnedPlotter {
    pub child: Child,
    pub stdout: ChildStdout,
}

impl Plotter {
    /// Build and spawn the subprocess for this plotter variant. stdout is
    /// piped back to the caller; stderr is piped and drained to the trace
    /// log so a chatty plotter can't block on a full stderr pipe.
    #[allow(clippy::expect_used)]
    pub fn spawn(&self) -> Result<SpawnedPlotter, ProcError> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(ProcError::Spawn)?;
        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");
        drain_stderr(stderr);

        Ok(SpawnedPlotter { child, stdout })
    }

    fn command(&self) -> Command {
        match self {
            Plotter::Mock { destination } => {
                let plot_file = destination.join(format!("plot-k32-{}.plot", random_suffix()));
                let mut cmd = Command::new(mock_binary());
                cmd.arg("--destination")
                    .arg(plot_file)
                    .arg("--duration")
                    .arg("60.0");
                cmd
            }
            Plotter::Chiabox {
                plotting_space,
                destination,
                farm_key,
                pool_key,
                forward_concurrency,
            } => {
                let mut cmd = Command::new("docker");
                cmd.arg("exec")
                    .arg("chiabox")
                    .arg("venv/bin/chia")
                    .arg("plots")
                    .arg("create")
                    .arg("-r")
                    .arg(forward_concurrency.to_string())
                    .arg("-t")
                    .arg(plotting_space)
                    .arg("-d")
                    .arg(destination)
                    .arg("-f")
                    .arg(farm_key)
                    .arg("-p")
                    .arg(pool_key)
                    .arg("-n")
                    .arg("1");
                cmd
            }
        }
    }
}

/// Path (or bare name, resolved via `PATH`) to the mock plotter binary.
/// Overridable via `PLOTFLEET_MOCKPLOT_BIN` so integration tests can point
/// at the workspace's own freshly-built `chiafan-plot-sim` without
/// requiring it to be installed on `PATH`.
fn mock_binary() -> String {
    std::env::var("PLOTFLEET_MOCKPLOT_BIN").unwrap_or_else(|_| "chiafan-plot-sim".to_string())
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

fn drain_stderr(stderr: tokio::process::ChildStderr) {
    use tokio::io::{AsyncBufReadExt, BufReader};
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(target: "plotfleet_proc::stderr", "{line}");
        }
    });
}

/// Ensure `plotting_space` and `destination` exist, clearing any stale
/// contents from `plotting_space` left behind by a prior run.
///
/// Mock mode prepares the directories locally; a real chiabox run prepares
/// them inside the container via `docker exec`.
pub async fn prepare_directories(
    plotting_space: &Path,
    destination: &Path,
    is_mock: bool,
) -> Result<(), ProcError> {
    if is_mock {
        tokio::fs::create_dir_all(plotting_space)
            .await
            .map_err(|source| ProcError::DirectoryPrep {
                path: plotting_space.to_path_buf(),
                source,
            })?;
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|source| ProcError::DirectoryPrep {
                path: destination.to_path_buf(),
                source,
            })?;
        clear_directory(plotting_space).await?;
    } else {
        for dir in [plotting_space, destination] {
            let status = Command::new("docker")
                .arg("exec")
                .arg("chiabox")
                .arg("mkdir")
                .arg("-p")
                .arg(dir)
                .status()
                .await
                .map_err(|source| ProcError::DirectoryPrep {
                    path: dir.to_path_buf(),
                    source,
                })?;
            if !status.success() {
                return Err(ProcError::DirectoryPrep {
                    path: dir.to_path_buf(),
                    source: std::io::Error::other("docker exec mkdir -p failed"),
                });
            }
        }
        clear_directory_in_chiabox(plotting_space).await?;
    }
    Ok(())
}

async fn clear_directory(dir: &Path) -> Result<(), ProcError> {
    let mut entries =
        tokio::fs::read_dir(dir)
            .await
            .map_err(|source| ProcError::ClearWorkspace {
                path: dir.to_path_buf(),
                source,
            })?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| ProcError::ClearWorkspace { path: dir.to_path_buf(), source })?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|source| ProcError::ClearWorkspace { path: path.clone(), source })?;
        let result = if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        result.map_err(|source| ProcError::ClearWorkspace { path, source })?;
    }
    Ok(())
}

async fn clear_directory_in_chiabox(dir: &Path) -> Result<(), ProcError> {
    let status = Command::new("docker")
        .arg("exec")
        .arg("chiabox")
        .arg("sh")
        .arg("-c")
        .arg(format!("rm -rf {0}/* {0}/.[!.]*", dir.display()))
        .status()
        .await
        .map_err(|source| ProcError::ClearWorkspace { path: dir.to_path_buf(), source })?;
    if !status.success() {
        return Err(ProcError::ClearWorkspace {
            path: dir.to_path_buf(),
            source: std::io::Error::other("docker exec clear failed"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "plotter_tests.rs"]
mod tests;
