//! # pel-api — HTTP Boundary for the Provenance Event Ledger
//!
//! Thin request/response layer over the coordinator and the history
//! service. Ingestion reports success whenever the local append succeeds;
//! anchor outcomes ride along as a status field.
//!
//! ## API Surface
//!
//! | Route                                              | Module              | Purpose                 |
//! |----------------------------------------------------|---------------------|-------------------------|
//! | `POST /v1/events`                                  | [`routes::events`]  | Record an event         |
//! | `POST /v1/batches/:batch/events/:event/reanchor`   | [`routes::events`]  | Manual re-anchoring     |
//! | `GET /v1/batches/:batch/history`                   | [`routes::history`] | Batch history           |
//! | `GET /v1/history?batchId=`                         | [`routes::history`] | Batch history (query)   |
//! | `GET /openapi.json`                                | [`openapi`]         | OpenAPI document        |
//! | `GET /health/*`                                    | (here)              | Probes                  |

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes are mounted alongside the API routes; authentication is
/// a perimeter concern and not part of this service.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::events::router())
        .merge(routes::history::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — the store is in-process, so a running process is a
/// ready process.
async fn readiness() -> &'static str {
    "ready"
}
