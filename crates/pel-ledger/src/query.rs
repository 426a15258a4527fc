//! # History Query Service
//!
//! The read path of the ledger: resolves a raw batch identifier and
//! returns the batch's ordered event sequence as typed views with the
//! anchor confirmation state attached. Pure reads, no side effects.

use std::sync::Arc;

use serde::Serialize;

use pel_core::{
    AnchorState, BatchId, EventId, EventRecord, GeoPoint, Timestamp, ValidationError,
};

use crate::store::LedgerStore;

/// A single history entry as served at the query boundary.
///
/// Concrete typed view rather than a raw record: the batch identifier is
/// implicit in the query, and the view carries the event identifier and
/// sequence so callers can address individual records (e.g. for manual
/// re-anchoring).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    /// The record's identifier.
    pub event_id: EventId,
    /// 0-based position within the batch.
    pub sequence: u64,
    /// Lifecycle stage reached.
    pub step: String,
    /// Free-text location label, if captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Coordinate fix, if captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoPoint>,
    /// Store-assigned UTC instant.
    pub timestamp: Timestamp,
    /// Anchor confirmation state.
    pub anchor_status: AnchorState,
    /// Receipt identifier, present once confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_receipt_id: Option<String>,
}

impl From<EventRecord> for EventView {
    fn from(record: EventRecord) -> Self {
        Self {
            event_id: record.event_id,
            sequence: record.sequence,
            step: record.step.as_str().to_string(),
            location: record.location,
            coords: record.coords,
            timestamp: record.timestamp,
            anchor_status: record.anchor_status,
            anchor_receipt_id: record.anchor_receipt_id,
        }
    }
}

/// Read-only query service over the ledger store.
#[derive(Debug, Clone)]
pub struct HistoryService {
    store: Arc<LedgerStore>,
}

impl HistoryService {
    /// Create a query service over the given store.
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Return the ordered event history for a batch.
    ///
    /// An unknown batch yields an empty vector. The only failure mode is
    /// a malformed batch identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the raw identifier is empty or
    /// over-long.
    pub fn query(&self, batch_id: &str) -> Result<Vec<EventView>, ValidationError> {
        let batch_id = BatchId::new(batch_id)?;
        Ok(self
            .store
            .read(&batch_id)
            .into_iter()
            .map(EventView::from)
            .collect())
    }
}
