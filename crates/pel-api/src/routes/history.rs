//! # Batch History API
//!
//! Serves a batch's ordered event sequence with anchor status attached.
//! Pure reads: an unknown batch is an empty history, never an error.
//!
//! ## Endpoints
//!
//! - `GET /v1/batches/:batch_id/history` — path-segment form
//! - `GET /v1/history?batchId=…` — query-parameter form, kept for
//!   callers built against the original boundary

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use pel_ledger::EventView;

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for the query-parameter form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    /// The batch to fetch history for.
    pub batch_id: String,
}

/// A batch's ordered event history.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Events in append order, oldest first.
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<EventView>,
}

/// Build the history router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/batches/:batch_id/history", get(batch_history))
        .route("/v1/history", get(history_by_query))
}

/// GET /v1/batches/:batch_id/history — Batch history, path form.
#[utoipa::path(
    get,
    path = "/v1/batches/{batch_id}/history",
    params(("batch_id" = String, Path, description = "Batch identifier")),
    responses(
        (status = 200, description = "Ordered event history (empty for an unknown batch)", body = HistoryResponse),
        (status = 422, description = "Malformed batch identifier", body = crate::error::ErrorBody),
    ),
    tag = "history"
)]
pub(crate) async fn batch_history(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let history = state.history.query(&batch_id)?;
    Ok(Json(HistoryResponse { history }))
}

/// GET /v1/history?batchId=… — Batch history, query-parameter form.
#[utoipa::path(
    get,
    path = "/v1/history",
    params(("batchId" = String, Query, description = "Batch identifier")),
    responses(
        (status = 200, description = "Ordered event history (empty for an unknown batch)", body = HistoryResponse),
        (status = 400, description = "Missing batchId parameter", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed batch identifier", body = crate::error::ErrorBody),
    ),
    tag = "history"
)]
pub(crate) async fn history_by_query(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Query(params) = params.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let history = state.history.query(&params.batch_id)?;
    Ok(Json(HistoryResponse { history }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pel_ledger::AppendRequest;

    fn seeded_state() -> AppState {
        let state = AppState::with_mock_anchor();
        state.store.append(
            AppendRequest::new("BATCH-001", "Harvested", None, None, None).unwrap(),
        );
        state.store.append(
            AppendRequest::new("BATCH-001", "Shipped", None, None, None).unwrap(),
        );
        state
    }

    #[tokio::test]
    async fn batch_history_returns_ordered_events() {
        let state = seeded_state();
        let Json(response) =
            batch_history(State(state), Path("BATCH-001".to_string())).await.unwrap();
        assert_eq!(response.history.len(), 2);
        assert_eq!(response.history[0].step, "Harvested");
        assert_eq!(response.history[1].step, "Shipped");
    }

    #[tokio::test]
    async fn unknown_batch_returns_empty_history() {
        let state = AppState::with_mock_anchor();
        let Json(response) =
            batch_history(State(state), Path("NO-SUCH".to_string())).await.unwrap();
        assert!(response.history.is_empty());
    }

    #[tokio::test]
    async fn blank_batch_id_is_validation_error() {
        let state = AppState::with_mock_anchor();
        let err = batch_history(State(state), Path("   ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn query_param_form_matches_path_form() {
        let state = seeded_state();
        let Json(by_path) =
            batch_history(State(state.clone()), Path("BATCH-001".to_string()))
                .await
                .unwrap();
        let Json(by_query) = history_by_query(
            State(state),
            Ok(Query(HistoryParams {
                batch_id: "BATCH-001".to_string(),
            })),
        )
        .await
        .unwrap();
        assert_eq!(by_path.history.len(), by_query.history.len());
    }
}
