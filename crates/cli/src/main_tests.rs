use super::*;
use cli::RunArgs;

#[test]
fn num_cpus_is_never_zero() {
    assert!(num_cpus() >= 1);
}

#[test]
fn inspect_log_reads_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.log");
    std::fs::write(
        &path,
        "Starting phase 2/4: backward\nTime for phase 2 = 12.5 seconds\n",
    )
    .unwrap();

    assert!(inspect_log(&path).is_ok());
}

#[test]
fn inspect_log_errors_on_a_missing_file() {
    let path = std::path::PathBuf::from("/nonexistent/path/does-not-exist.log");
    assert!(inspect_log(&path).is_err());
}

#[tokio::test]
async fn run_supervisor_rejects_an_empty_worker_list() {
    let run = RunArgs {
        farm_key: "farm".to_string(),
        pool_key: "pool".to_string(),
        workers: vec![],
        is_mock: true,
        port: "0".to_string(),
        staggering: 0,
        forward_concurrency: 1,
        use_chiabox: false,
    };

    let result = run_supervisor(run).await;
    assert!(result.is_err());
}
