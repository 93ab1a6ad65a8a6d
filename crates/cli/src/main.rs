// SPDX-License-Identifier: MIT

//! plotfleetd — the plot-fleet supervisor daemon.
//!
//! Parses CLI flags, wires up the supervisor and its workers, probes
//! `chiabox` readiness when any worker is non-mock, starts the control
//! loop and the HTTP control surface, and shuts everything down cleanly
//! on SIGINT/SIGTERM.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, LogsCommand, RunArgs};
use plotfleet_core::SupervisorConfig;
use plotfleet_engine::Supervisor;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Logs {
            command: LogsCommand::Inspect { path },
        }) => {
            inspect_log(&path)?;
            Ok(())
        }
        None => run_supervisor(cli.run).await,
    }
}

fn inspect_log(path: &std::path::Path) -> Result<()> {
    let (stage, progress) = plotfleet_core::log_parser::inspect_log_file(path)
        .with_context(|| format!("reading log file {}", path.display()))?;
    println!("stage: {stage}");
    println!("progress: {progress:.2} %");
    Ok(())
}

async fn run_supervisor(run: RunArgs) -> Result<()> {
    let worker_specs = run
        .parse_worker_specs()
        .map_err(anyhow::Error::msg)
        .context("invalid --worker spec")?;
    if worker_specs.is_empty() {
        anyhow::bail!("at least one --worker WORKSPACE:DESTINATION is required");
    }

    let supervisor_config = SupervisorConfig {
        farm_key: run.farm_key.clone(),
        pool_key: run.pool_key.clone(),
        staggering: run.staggering_duration(),
        use_chiabox: run.use_chiabox,
        port: run.port.clone(),
        ..SupervisorConfig::default()
    };

    let cpu_count = num_cpus();
    let supervisor = Arc::new(Supervisor::new(
        supervisor_config,
        worker_specs,
        run.forward_concurrency,
        run.is_mock,
        cpu_count,
    ));

    if run.use_chiabox && supervisor.any_worker_is_real() {
        info!("probing chiabox readiness");
        plotfleet_proc::wait_for_chiabox()
            .await
            .context("chiabox container never reported running")?;
    }

    supervisor.run();

    let addr = format!("0.0.0.0:{}", run.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding control API to {addr}"))?;
    info!(%addr, "control API listening");

    let app = plotfleet_api::router(Arc::clone(&supervisor));
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "control API server exited");
        }
    });

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining workers");
    supervisor.ensure_shutdown().await;
    server.abort();

    info!("supervisor stopped");
    Ok(())
}

/// Block until SIGINT or SIGTERM arrives (spec.md §6).
async fn wait_for_shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Set up `tracing`: stdout for interactive use, plus a non-blocking
/// rolling-never file appender under `/tmp` so a job's failure is still on
/// record after the terminal that launched `plotfleetd` is gone. Matches
/// the teacher daemon's `setup_logging` shape (file layer + env filter),
/// scaled down since this supervisor has no per-user config directory to
/// anchor a log path to.
fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never("/tmp", "plotfleetd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
