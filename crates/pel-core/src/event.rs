//! # Provenance Event Record
//!
//! The unit of record: one discrete supply-chain event ("batch X reached
//! step Y at location/time Z"), plus the anchor lifecycle tracked against
//! the external consensus ledger.
//!
//! ## Mutability Model
//!
//! An [`EventRecord`] is immutable after append except for its anchor
//! fields, and those change only through
//! [`EventRecord::apply_anchor_outcome`], which enforces the legal
//! transitions:
//!
//! ```text
//! Pending ──confirm──▶ Confirmed        (terminal success)
//!    │                     ▲
//!  fail                 confirm         (anchor succeeded on retry)
//!    ▼                     │
//! Failed ──────────────────┘
//! ```
//!
//! `Confirmed → Failed` is rejected: a confirmed anchor cannot regress.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{BatchId, Step};
use crate::error::TransitionError;
use crate::geo::GeoPoint;
use crate::temporal::Timestamp;

/// A unique identifier for a provenance event, assigned at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Create a new random event identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an event identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anchor lifecycle status of an event, independent of local-store success.
///
/// Serializes as `"Pending"` / `"Confirmed"` / `"Failed"`, which is the
/// wire form callers see in ingest responses and history views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorState {
    /// Local append succeeded; no anchor attempt has settled yet.
    Pending,
    /// The external ledger durably recorded the event.
    Confirmed,
    /// The most recent anchor attempt failed. May still be retried.
    Failed,
}

impl AnchorState {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for AnchorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A settled result of one anchor submission, to be applied to a record.
///
/// `Pending` is deliberately unrepresentable here: it is the initial
/// state, never an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// The external ledger accepted the submission.
    Confirmed {
        /// Opaque receipt identifier returned by the ledger.
        receipt_id: String,
    },
    /// The submission failed (transient exhaustion or permanent refusal).
    Failed,
}

/// One recorded supply-chain event for a batch.
///
/// Created exactly once on successful local append; never deleted.
/// Serializes in camelCase to match the ingest/query wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Unique identifier, assigned at append.
    pub event_id: EventId,
    /// The provenance chain this event belongs to.
    pub batch_id: BatchId,
    /// 0-based position within the batch's append order.
    pub sequence: u64,
    /// Lifecycle stage reached.
    pub step: Step,
    /// Optional free-text location label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Optional coordinate fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoPoint>,
    /// Store-assigned UTC instant, monotonic non-decreasing per batch.
    pub timestamp: Timestamp,
    /// Anchor lifecycle status.
    pub anchor_status: AnchorState,
    /// Receipt identifier, set once confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_receipt_id: Option<String>,
}

impl EventRecord {
    /// Apply a settled anchor outcome to this record.
    ///
    /// Returns `Ok(true)` when the record changed, `Ok(false)` for an
    /// idempotent no-op (re-confirming with the same receipt, re-failing
    /// an already failed record).
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] when the outcome
    /// would regress a confirmed anchor to failed, or confirm with a
    /// receipt that conflicts with the one already recorded.
    pub fn apply_anchor_outcome(
        &mut self,
        outcome: &AnchorOutcome,
    ) -> Result<bool, TransitionError> {
        match (self.anchor_status, outcome) {
            (
                AnchorState::Pending | AnchorState::Failed,
                AnchorOutcome::Confirmed { receipt_id },
            ) => {
                self.anchor_status = AnchorState::Confirmed;
                self.anchor_receipt_id = Some(receipt_id.clone());
                Ok(true)
            }
            (AnchorState::Confirmed, AnchorOutcome::Confirmed { receipt_id }) => {
                if self.anchor_receipt_id.as_deref() == Some(receipt_id.as_str()) {
                    Ok(false)
                } else {
                    Err(TransitionError::InvalidTransition {
                        event_id: self.event_id,
                        from: AnchorState::Confirmed,
                        to: AnchorState::Confirmed,
                        reason: format!(
                            "conflicting receipt: have {:?}, got {receipt_id:?}",
                            self.anchor_receipt_id.as_deref().unwrap_or("")
                        ),
                    })
                }
            }
            (AnchorState::Pending, AnchorOutcome::Failed) => {
                self.anchor_status = AnchorState::Failed;
                Ok(true)
            }
            (AnchorState::Failed, AnchorOutcome::Failed) => Ok(false),
            (AnchorState::Confirmed, AnchorOutcome::Failed) => {
                Err(TransitionError::InvalidTransition {
                    event_id: self.event_id,
                    from: AnchorState::Confirmed,
                    to: AnchorState::Failed,
                    reason: "a confirmed anchor cannot regress".to_string(),
                })
            }
        }
    }
}
