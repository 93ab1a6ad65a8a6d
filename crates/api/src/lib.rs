// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! plotfleet-api: the HTTP control/status surface (spec.md §4.5).
//!
//! Both GET and POST are accepted on `/status`, `/start`, and `/drain`;
//! `/abort` takes a JSON body and is POST-only. None of the routes require
//! authentication (spec.md's Non-goals explicitly exclude it).

mod handlers;
mod payload;

use axum::routing::{get, post};
use axum::Router;
use plotfleet_engine::Supervisor;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler: just the supervisor, since every
/// endpoint either reads a snapshot from it or issues a control command.
pub type AppState = Arc<Supervisor>;

/// Build the control API router (spec.md §4.5). Callers bind it with
/// `axum::serve` to `0.0.0.0:<port>` (default `5000`, overridden by
/// `--port`).
pub fn router(supervisor: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::status).post(handlers::status))
        .route("/start", get(handlers::start).post(handlers::start))
        .route("/drain", get(handlers::drain).post(handlers::drain))
        .route("/abort", post(handlers::abort))
        .layer(TraceLayer::new_for_http())
        .with_state(supervisor)
}

#[cfg(test)]
mod tests;
