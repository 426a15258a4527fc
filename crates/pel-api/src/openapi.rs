//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Provenance Event Ledger API",
        version = "0.1.0",
        description = "Records supply-chain events per batch, anchors each event onto an external consensus ledger for tamper-evidence, and serves ordered batch histories with anchor status.",
        license(name = "Apache-2.0")
    ),
    paths(
        crate::routes::events::log_event,
        crate::routes::events::reanchor_event,
        crate::routes::history::batch_history,
        crate::routes::history::history_by_query,
    ),
    components(schemas(
        // Event DTOs
        crate::routes::events::LogEventRequest,
        crate::routes::events::CoordsInput,
        crate::routes::events::IngestResponse,
        // History DTOs
        crate::routes::history::HistoryResponse,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "events", description = "Event ingestion & anchoring"),
        (name = "history", description = "Batch history queries"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_paths() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/v1/events"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/history"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/v1/batches/{batch_id}/history"));
        assert!(paths
            .iter()
            .any(|p| p.as_str() == "/v1/batches/{batch_id}/events/{event_id}/reanchor"));
    }

    #[test]
    fn spec_serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Provenance Event Ledger API"));
    }
}
