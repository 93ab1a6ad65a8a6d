// SPDX-License-Identifier: MIT

use crate::payload::{AbortRequest, AbortResponse, CodeResponse, ErrorResponse, StatusResponse};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plotfleet_engine::EngineError;

pub async fn status(State(supervisor): State<AppState>) -> Json<StatusResponse> {
    let server = supervisor.inspect().await;
    let mut workers = Vec::new();
    for worker in supervisor.workers() {
        workers.push(worker.inspect().await);
    }
    let jobs = supervisor
        .get_status()
        .await
        .into_iter()
        .map(|status| status.to_payload())
        .collect();

    Json(StatusResponse { server, workers, jobs })
}

pub async fn start(State(supervisor): State<AppState>) -> Json<CodeResponse> {
    supervisor.run();
    Json(CodeResponse { code: "started" })
}

pub async fn drain(State(supervisor): State<AppState>) -> Json<CodeResponse> {
    supervisor.drain();
    Json(CodeResponse { code: "drained" })
}

pub async fn abort(
    State(supervisor): State<AppState>,
    Json(body): Json<AbortRequest>,
) -> Response {
    match supervisor.abort(&body.target).await {
        Ok(()) => Json(AbortResponse {
            code: "aborted",
            target: body.target,
        })
        .into_response(),
        Err(EngineError::JobNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no active job named {}", body.target),
            }),
        )
            .into_response(),
        Err(other) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: other.to_string() }),
        )
            .into_response(),
    }
}
