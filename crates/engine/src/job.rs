// SPDX-License-Identifier: MIT

//! A single plotter subprocess plus its tail agent and derived state.

use plotfleet_core::log_parser::{self, LogEvent};
use plotfleet_core::{JobConfig, JobName, JobState, JobStatus, Stage, StageDetail};
use plotfleet_proc::{self, Plotter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;

const PLOTTER_TERMINATE_TIMEOUT: Duration = Duration::from_secs(60);
const TAIL_FLUSH_EVERY: u64 = 10;

#[derive(Debug)]
struct RuntimeState {
    starting_time: SystemTime,
    stop_time: Option<SystemTime>,
    state: JobState,
    stage: Stage,
    progress: f64,
    stage_details: Vec<StageDetail>,
    error_message: String,
    aborted: bool,
}

impl RuntimeState {
    fn new(now: SystemTime) -> Self {
        Self {
            starting_time: now,
            stop_time: None,
            state: JobState::Ongoing,
            stage: Stage::Initialization,
            progress: 0.0,
            stage_details: Vec::new(),
            error_message: String::new(),
            aborted: false,
        }
    }
}

struct Shared {
    name: JobName,
    status: parking_lot::Mutex<RuntimeState>,
    child_slot: AsyncMutex<Option<Child>>,
    shutdown_notify: Notify,
    shutting_down: AtomicBool,
}

/// A live (or just-terminated-but-not-yet-reaped) plotting job.
///
/// Owns no back-pointer to its worker (spec §9: "avoid cyclic references by
/// letting the Job own no back-pointer"); the supervisor is the only thing
/// that links a job back to its worker slot.
pub struct Job {
    shared: Arc<Shared>,
    tail_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl Job {
    /// Construct a job and start its tail agent. Matches spec §4.2's
    /// construction side effects: state becomes `ONGOING`/`INITIALIZATION`
    /// immediately, with the actual precondition checks and spawn happening
    /// on the tail agent.
    pub fn spawn(name: JobName, config: JobConfig, now: SystemTime) -> Self {
        let shared = Arc::new(Shared {
            name,
            status: parking_lot::Mutex::new(RuntimeState::new(now)),
            child_slot: AsyncMutex::new(None),
            shutdown_notify: Notify::new(),
            shutting_down: AtomicBool::new(false),
        });

        let task_shared = shared.clone();
        let handle = tokio::spawn(async move {
            run(task_shared.clone(), config).await;
        });

        Self {
            shared,
            tail_handle: AsyncMutex::new(Some(handle)),
        }
    }

    pub fn name(&self) -> &JobName {
        &self.shared.name
    }

    /// The time this job was constructed (spec.md §3's `starting_time`),
    /// independent of whether it has since terminated.
    pub fn starting_time(&self) -> SystemTime {
        self.shared.status.lock().starting_time
    }

    /// A consistent snapshot of this job's state. `time_elapsed` is
    /// computed against `now` so callers control the time source used.
    pub fn inspect(&self, now: SystemTime) -> JobStatus {
        let status = self.shared.status.lock();
        let elapsed_end = status.stop_time.unwrap_or(now);
        let time_elapsed = elapsed_end
            .duration_since(status.starting_time)
            .unwrap_or(Duration::ZERO);
        JobStatus {
            job_name: self.shared.name.clone(),
            time_elapsed,
            stage: status.stage,
            state: status.state,
            stage_details: status.stage_details.clone(),
            progress: status.progress,
            error_message: status.error_message.clone(),
            aborted: status.aborted,
        }
    }

    /// `forward_concurrency` while in {INITIALIZATION, FORWARD}, 1 while in
    /// {BACKWARD, COMPRESSION}, 0 otherwise.
    pub fn used_cpu_count(&self, forward_concurrency: u32) -> u32 {
        match self.shared.status.lock().stage {
            Stage::Initialization | Stage::Forward => forward_concurrency,
            Stage::Backward | Stage::Compression => 1,
            Stage::WriteCheckpoint | Stage::S3Migration | Stage::End => 0,
        }
    }

    /// Force this job to terminate: kill the subprocess if present, force
    /// `state = FAIL`, and await the tail agent before returning.
    pub async fn ensure_shutdown(&self) {
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        self.shared.shutdown_notify.notify_waiters();

        if let Some(child) = self.shared.child_slot.lock().await.as_mut() {
            let _ = child.start_kill();
        }

        {
            let mut status = self.shared.status.lock();
            if status.state == JobState::Ongoing {
                status.state = JobState::Fail;
                status.error_message = "Cannot terminate the plotting process".to_string();
                status.aborted = true;
                status.stop_time.get_or_insert(SystemTime::now());
            }
        }

        let handle = self.tail_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

fn fail(shared: &Shared, message: impl Into<String>) {
    let mut status = shared.status.lock();
    status.state = JobState::Fail;
    status.error_message = message.into();
    status.stop_time = Some(SystemTime::now());
}

fn succeed(shared: &Shared) {
    let mut status = shared.status.lock();
    status.stage = Stage::End;
    status.progress = 100.0;
    status.state = JobState::Success;
    status.stop_time = Some(SystemTime::now());
}

#[allow(clippy::expect_used)]
async fn run(shared: Arc<Shared>, config: JobConfig) {
    // 1. Precondition checks.
    if config.farm_key.is_empty() {
        fail(&shared, "Missing farmer key");
        return;
    }
    if config.pool_key.is_empty() {
        fail(&shared, "Missing pool key");
        return;
    }

    // 2. Directory preparation.
    if let Err(e) =
        plotfleet_proc::prepare_directories(&config.plotting_space, &config.destination, config.is_mock)
            .await
    {
        fail(&shared, e.to_string());
        return;
    }

    // 3. Spawn.
    let plotter = if config.is_mock {
        Plotter::Mock {
            destination: config.destination.clone(),
        }
    } else {
        Plotter::Chiabox {
            plotting_space: config.plotting_space.clone(),
            destination: config.destination.clone(),
            farm_key: config.farm_key.clone(),
            pool_key: config.pool_key.clone(),
            forward_concurrency: config.forward_concurrency,
        }
    };

    let spawned = match plotter.spawn() {
        Ok(spawned) => spawned,
        Err(e) => {
            fail(&shared, e.to_string());
            return;
        }
    };

    // The child lives in `child_slot` from the moment it's spawned so
    // `ensure_shutdown` can kill it at any point, including mid-tail.
    *shared.child_slot.lock().await = Some(spawned.child);

    let log_path = log_file_path(&config, &shared.name);
    let log_file = match tokio::fs::File::create(&log_path).await {
        Ok(file) => file,
        Err(e) => {
            if let Some(child) = shared.child_slot.lock().await.as_mut() {
                let _ = child.start_kill();
            }
            fail(&shared, format!("failed to create log file {}: {e}", log_path.display()));
            return;
        }
    };
    let mut log_writer = tokio::io::BufWriter::new(log_file);

    // 4. Tail.
    let mut final_plot: Option<PathBuf> = None;
    let mut num_lines: u64 = 0;
    let mut lines = BufReader::new(spawned.stdout).lines();

    let tail_result = loop {
        if shared.shutting_down.load(Ordering::SeqCst) {
            break Ok(());
        }

        tokio::select! {
            biased;
            _ = shared.shutdown_notify.notified() => {
                break Ok(());
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        num_lines += 1;
                        {
                            let mut status = shared.status.lock();
                            status.progress = log_parser::line_progress(num_lines);
                        }

                        let _ = log_writer.write_all(line.as_bytes()).await;
                        let _ = log_writer.write_all(b"\n").await;
                        if num_lines % TAIL_FLUSH_EVERY == 0 {
                            let _ = log_writer.flush().await;
                        }

                        if num_lines > log_parser::MAX_TAILED_LINES {
                            break Ok(());
                        }

                        match log_parser::parse_line(&line) {
                            Some(LogEvent::PhaseStart { phase }) => {
                                shared.status.lock().stage = Stage::from_phase_id(phase);
                            }
                            Some(LogEvent::PhaseEnd { phase, seconds }) => {
                                shared.status.lock().stage_details.push(StageDetail {
                                    stage: Stage::from_phase_id(phase),
                                    duration: Duration::from_secs_f64(seconds),
                                });
                            }
                            Some(LogEvent::Complete { path }) => {
                                final_plot = Some(PathBuf::from(path));
                            }
                            None => {}
                        }
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            }
        }
    };
    let _ = log_writer.flush().await;

    if let Err(e) = tail_result {
        if let Some(child) = shared.child_slot.lock().await.as_mut() {
            let _ = child.start_kill();
        }
        fail(&shared, format!("error reading plotter stdout: {e}"));
        return;
    }

    // 5. Terminate plotter.
    let wait_result = {
        let mut slot = shared.child_slot.lock().await;
        let child = slot.as_mut().expect("child stored in slot at spawn time");
        tokio::time::timeout(PLOTTER_TERMINATE_TIMEOUT, child.wait()).await
    };
    match wait_result {
        Ok(Ok(_exit_status)) => {}
        Ok(Err(e)) => {
            fail(&shared, format!("error waiting for plotter: {e}"));
            return;
        }
        Err(_elapsed) => {
            if let Some(child) = shared.child_slot.lock().await.as_mut() {
                let _ = child.start_kill();
            }
            // Shares spec §7's "Cannot terminate the plotting process"
            // message with the forceful abort/shutdown path; `aborted`
            // distinguishes the two for callers that care (SPEC_FULL.md §11).
            fail(&shared, "Cannot terminate the plotting process");
            return;
        }
    }

    if shared.shutting_down.load(Ordering::SeqCst) {
        // ensure_shutdown already forced FAIL; nothing further to do.
        return;
    }

    // 6. Completion check.
    let final_plot = match final_plot {
        Some(path) => path,
        None => {
            fail(&shared, "Could not locate generated plot");
            return;
        }
    };

    // 7. Optional upload.
    if config.s3_bucket.is_empty() {
        succeed(&shared);
        return;
    }

    {
        let mut status = shared.status.lock();
        status.stage = Stage::S3Migration;
        status.progress = 99.0;
    }

    match plotfleet_proc::upload(&final_plot, &config.s3_bucket).await {
        Ok(()) => succeed(&shared),
        Err(e) => fail(&shared, e.to_string()),
    }
}

fn log_file_path(config: &JobConfig, name: &JobName) -> PathBuf {
    let timestamp = format_timestamp(SystemTime::now());
    config
        .log_dir
        .join(format!("chiafan_plotting_{name}_{timestamp}.log"))
}

fn format_timestamp(t: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(t)
        .format("%Y%m%d_%H_%M_%S")
        .to_string()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
