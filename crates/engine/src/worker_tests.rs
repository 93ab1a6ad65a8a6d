use super::*;
use plotfleet_core::WorkerConfig;
use std::time::Duration;

fn worker(dir: &std::path::Path, is_mock: bool) -> Worker {
    Worker::new(
        WorkerName::new("worker1"),
        WorkerConfig {
            workspace: dir.join("workspace"),
            destination: dir.join("destination"),
            forward_concurrency: 4,
            is_mock,
        },
    )
}

#[tokio::test]
async fn idle_worker_reports_nothing_running() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);
    let status = w.inspect().await;
    assert_eq!(status.name, "worker1");
    assert_eq!(status.running, "NOTHING");
    assert_eq!(w.used_cpu_count().await, 0);
}

#[tokio::test]
async fn spawn_job_rejects_a_second_concurrent_job() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);

    w.spawn_job(String::new(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap();
    assert!(!w.is_idle().await);

    let err = w
        .spawn_job("farm".to_string(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::WorkerBusy(_)));

    w.ensure_shutdown().await;
}

#[tokio::test]
async fn job_names_are_sequential_per_worker() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);

    w.spawn_job(String::new(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap();
    let name1 = w.active_job_name().await.unwrap();
    assert_eq!(name1, "worker1.job1");
    w.ensure_shutdown().await;

    let mut history = Vec::new();
    w.reap_if_terminal(SystemTime::now(), &mut history).await;
    assert!(w.is_idle().await);

    w.spawn_job(String::new(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap();
    let name2 = w.active_job_name().await.unwrap();
    assert_eq!(name2, "worker1.job2");
    w.ensure_shutdown().await;
}

#[tokio::test]
async fn reap_if_terminal_moves_a_failed_job_into_history_and_frees_the_worker() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);

    // Missing farm key fails the job immediately, before any subprocess.
    w.spawn_job(String::new(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap();

    // Give the tail agent a moment to run the precondition check.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut history = Vec::new();
    w.reap_if_terminal(SystemTime::now(), &mut history).await;

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].error_message, "Missing farmer key");
    assert!(w.is_idle().await);
}

#[tokio::test]
async fn abort_job_clears_the_worker_even_mid_run() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);

    w.spawn_job("farm".to_string(), "pool".to_string(), dir.path().to_path_buf(), SystemTime::now())
        .await
        .unwrap();

    let aborted = w.abort_job().await;
    assert!(aborted);
    assert!(w.is_idle().await);

    // Aborting an already-idle worker is a documented no-op.
    assert!(!w.abort_job().await);
}

#[tokio::test]
async fn active_job_started_at_reports_the_recorded_starting_time() {
    let dir = tempfile::tempdir().unwrap();
    let w = worker(dir.path(), true);
    let start = SystemTime::now();

    w.spawn_job(String::new(), "pool".to_string(), dir.path().to_path_buf(), start)
        .await
        .unwrap();

    assert_eq!(w.active_job_started_at().await, Some(start));
    w.ensure_shutdown().await;
}
