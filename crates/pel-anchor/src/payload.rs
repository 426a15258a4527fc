//! # Anchor Payload
//!
//! What actually lands on the external ledger: the UTF-8 JSON
//! serialization of an event's content fields, excluding anchor status.
//! Keeping the anchor fields out means the ledger's copy can be compared
//! byte-for-byte against the local record at any later audit, and a
//! resubmission after retry carries identical bytes.

use serde::{Deserialize, Serialize};

use pel_core::{BatchId, EventRecord, GeoPoint, Step, Timestamp};

/// The serialized content of one event as submitted to the ledger.
///
/// CamelCase wire form: `{batchId, step, location?, coords?, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorPayload {
    /// The provenance chain the event belongs to.
    pub batch_id: BatchId,
    /// Lifecycle stage reached.
    pub step: Step,
    /// Free-text location label, if captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Coordinate fix, if captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoPoint>,
    /// Store-assigned UTC instant.
    pub timestamp: Timestamp,
}

impl From<&EventRecord> for AnchorPayload {
    fn from(record: &EventRecord) -> Self {
        Self {
            batch_id: record.batch_id.clone(),
            step: record.step.clone(),
            location: record.location.clone(),
            coords: record.coords,
            timestamp: record.timestamp,
        }
    }
}

impl AnchorPayload {
    /// Serialize to the UTF-8 JSON bytes handed to the anchor client.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error; with this field set this
    /// cannot occur in practice, but the coordinator still handles it by
    /// marking the event failed rather than panicking.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
