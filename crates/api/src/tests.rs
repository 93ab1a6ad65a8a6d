use crate::router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use plotfleet_core::SupervisorConfig;
use plotfleet_engine::Supervisor;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_supervisor(dir: &std::path::Path, farm_key: &str) -> Arc<Supervisor> {
    let config = SupervisorConfig {
        farm_key: farm_key.to_string(),
        pool_key: "pool".to_string(),
        staggering: Duration::from_secs(0),
        use_chiabox: false,
        port: "5000".to_string(),
        tick_period: Duration::from_millis(1),
    };
    let specs = vec![(dir.join("ws1"), dir.join("dest1"))];
    Arc::new(Supervisor::new(config, specs, 1, true, 64))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn status_reports_stopped_pipeline_with_zero_workers_running() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");
    let app = router(supervisor);

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["server"]["pipeline"], "stopped");
    assert_eq!(json["workers"].as_array().unwrap().len(), 1);
    assert_eq!(json["workers"][0]["name"], "worker1");
    assert_eq!(json["workers"][0]["running"], "NOTHING");
    assert_eq!(json["jobs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn status_accepts_both_get_and_post() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");
    let app = router(supervisor);

    let get_response = app
        .clone()
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);

    let post_response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(post_response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_returns_started_and_transitions_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");
    let app = router(Arc::clone(&supervisor));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["code"], "started");
    assert_eq!(supervisor.inspect().await.pipeline, "working");

    supervisor.ensure_shutdown().await;
}

#[tokio::test]
async fn drain_returns_drained() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");
    let app = router(supervisor);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/drain")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["code"], "drained");
}

#[tokio::test]
async fn abort_returns_404_for_an_unknown_job() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");
    let app = router(supervisor);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/abort")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"target": "worker9.job1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn abort_terminates_the_named_active_job() {
    let dir = tempfile::tempdir().unwrap();
    let supervisor = test_supervisor(dir.path(), "farm");

    // Drive one control-loop tick directly so a job exists to abort,
    // without waiting on the real 1.6s tick period.
    let worker = &supervisor.workers()[0];
    worker
        .spawn_job(
            "farm".to_string(),
            "pool".to_string(),
            PathBuf::from("/tmp"),
            std::time::SystemTime::now(),
        )
        .await
        .unwrap();
    let job_name = worker.active_job_name().await.unwrap();

    let app = router(Arc::clone(&supervisor));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/abort")
                .header("content-type", "application/json")
                .body(Body::from(format!(r#"{{"target": "{job_name}"}}"#)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], "aborted");
    assert_eq!(json["target"], job_name);
    assert!(worker.is_idle().await);
}
