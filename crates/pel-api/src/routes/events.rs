//! # Event Ingestion API
//!
//! Records a supply-chain event for a batch and drives its anchoring onto
//! the external ledger.
//!
//! ## Endpoints
//!
//! - `POST /v1/events` — record an event
//! - `POST /v1/batches/:batch_id/events/:event_id/reanchor` — re-drive
//!   anchoring for an event whose attempts were exhausted
//!
//! Ingestion reports success whenever the local append succeeded; the
//! anchor outcome is a status field on the response, never the success or
//! failure of the call itself.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use pel_core::{AnchorState, BatchId, EventId, EventRecord};
use pel_ledger::{AppendRequest, EventRef};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Coordinate pair as it arrives on the wire.
///
/// Both components are individually optional so that a half-populated
/// pair is caught by validation (422) instead of a generic parse failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CoordsInput {
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lng: Option<f64>,
}

/// Request to record a provenance event.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEventRequest {
    /// The provenance chain to append to.
    pub batch_id: String,
    /// Lifecycle stage reached.
    pub step: String,
    /// Optional free-text location label.
    #[serde(default)]
    pub location: Option<String>,
    /// Optional coordinate fix, already resolved by the caller.
    #[serde(default)]
    pub coords: Option<CoordsInput>,
}

impl Validate for LogEventRequest {
    fn validate(&self) -> Result<(), String> {
        if self.batch_id.trim().is_empty() {
            return Err("batchId must not be empty".to_string());
        }
        if self.step.trim().is_empty() {
            return Err("step must not be empty".to_string());
        }
        if let Some(coords) = &self.coords {
            if coords.lat.is_some() != coords.lng.is_some() {
                return Err("coords must include both lat and lng".to_string());
            }
        }
        Ok(())
    }
}

/// Response to a successful ingest or re-anchor call.
///
/// `success` refers to local durability; `status` is the anchor outcome
/// as of the first submit attempt and may still move from `Failed` to
/// `Confirmed` as background retries land.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    /// Whether the event is durably recorded locally. Always `true` in a
    /// returned response; failures surface as error bodies.
    pub success: bool,
    /// Anchor status at response time.
    #[schema(value_type = String)]
    pub status: AnchorState,
    /// The recorded event.
    #[schema(value_type = Object)]
    pub log: EventRecord,
}

impl IngestResponse {
    fn from_record(record: EventRecord) -> Self {
        Self {
            success: true,
            status: record.anchor_status,
            log: record,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/events", post(log_event))
        .route(
            "/v1/batches/:batch_id/events/:event_id/reanchor",
            post(reanchor_event),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/events — Record a provenance event.
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = LogEventRequest,
    responses(
        (status = 201, description = "Event recorded locally; anchor outcome in `status`", body = IngestResponse),
        (status = 400, description = "Malformed JSON body", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "events"
)]
pub(crate) async fn log_event(
    State(state): State<AppState>,
    body: Result<Json<LogEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let (lat, lng) = match req.coords {
        Some(coords) => (coords.lat, coords.lng),
        None => (None, None),
    };
    let append = AppendRequest::new(req.batch_id, req.step, req.location, lat, lng)?;
    let record = state.coordinator.append(append).await;
    Ok((StatusCode::CREATED, Json(IngestResponse::from_record(record))))
}

/// POST /v1/batches/:batch_id/events/:event_id/reanchor — Re-drive
/// anchoring for a failed event.
#[utoipa::path(
    post,
    path = "/v1/batches/{batch_id}/events/{event_id}/reanchor",
    params(
        ("batch_id" = String, Path, description = "Batch identifier"),
        ("event_id" = Uuid, Path, description = "Event identifier"),
    ),
    responses(
        (status = 200, description = "Re-anchor attempt settled", body = IngestResponse),
        (status = 404, description = "Unknown batch or event", body = crate::error::ErrorBody),
        (status = 409, description = "Event is not in the Failed state", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed batch identifier", body = crate::error::ErrorBody),
    ),
    tag = "events"
)]
pub(crate) async fn reanchor_event(
    State(state): State<AppState>,
    Path((batch_id, event_id)): Path<(String, Uuid)>,
) -> Result<Json<IngestResponse>, AppError> {
    let batch_id = BatchId::new(batch_id)?;
    let event = EventRef::new(batch_id, EventId::from_uuid(event_id));
    let record = state.coordinator.reanchor(&event).await?;
    Ok(Json(IngestResponse::from_record(record)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_request(batch_id: &str, step: &str) -> LogEventRequest {
        LogEventRequest {
            batch_id: batch_id.to_string(),
            step: step.to_string(),
            location: None,
            coords: None,
        }
    }

    #[test]
    fn validate_rejects_empty_batch_id() {
        let err = log_request("  ", "Harvested").validate().unwrap_err();
        assert!(err.contains("batchId"));
    }

    #[test]
    fn validate_rejects_empty_step() {
        let err = log_request("BATCH-001", "").validate().unwrap_err();
        assert!(err.contains("step"));
    }

    #[test]
    fn validate_rejects_partial_coords() {
        let mut req = log_request("BATCH-001", "Harvested");
        req.coords = Some(CoordsInput {
            lat: Some(1.0),
            lng: None,
        });
        let err = req.validate().unwrap_err();
        assert!(err.contains("both lat and lng"));
    }

    #[test]
    fn validate_accepts_complete_coords() {
        let mut req = log_request("BATCH-001", "Harvested");
        req.coords = Some(CoordsInput {
            lat: Some(1.0),
            lng: Some(2.0),
        });
        assert!(req.validate().is_ok());
    }

    #[tokio::test]
    async fn log_event_returns_201_with_record() {
        let state = AppState::with_mock_anchor();
        let (status, Json(response)) =
            log_event(State(state.clone()), Ok(Json(log_request("BATCH-001", "Harvested"))))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(response.success);
        assert_eq!(response.status, AnchorState::Confirmed);
        assert_eq!(response.log.step.as_str(), "Harvested");
        assert_eq!(state.store.event_count(), 1);
    }

    #[tokio::test]
    async fn log_event_rejects_out_of_range_coords() {
        let state = AppState::with_mock_anchor();
        let mut req = log_request("BATCH-001", "Harvested");
        req.coords = Some(CoordsInput {
            lat: Some(123.0),
            lng: Some(0.0),
        });
        let err = log_event(State(state.clone()), Ok(Json(req))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Nothing was recorded.
        assert_eq!(state.store.event_count(), 0);
    }

    #[tokio::test]
    async fn reanchor_unknown_event_returns_not_found() {
        let state = AppState::with_mock_anchor();
        let err = reanchor_event(
            State(state),
            Path(("BATCH-001".to_string(), Uuid::new_v4())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reanchor_confirmed_event_returns_conflict() {
        let state = AppState::with_mock_anchor();
        let (_, Json(response)) =
            log_event(State(state.clone()), Ok(Json(log_request("BATCH-001", "Harvested"))))
                .await
                .unwrap();
        assert_eq!(response.status, AnchorState::Confirmed);

        let err = reanchor_event(
            State(state),
            Path((
                "BATCH-001".to_string(),
                *response.log.event_id.as_uuid(),
            )),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
