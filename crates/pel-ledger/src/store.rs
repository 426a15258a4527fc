//! # Append-Only Event Store
//!
//! In-process store of [`EventRecord`]s keyed by batch identifier. The
//! store exclusively owns all records: appends create them, and anchor
//! status changes go through [`LedgerStore::update_anchor_status`], which
//! delegates to the record's own transition rules.
//!
//! ## Ordering Guarantees
//!
//! Within one batch, records are totally ordered by append completion:
//! sequence numbers are dense from 0 and timestamps never decrease. When
//! the wall clock reads at or before the previous record's timestamp, the
//! new record gets `previous + 1µs` instead.
//!
//! ## Locking Discipline
//!
//! A `RwLock<HashMap>` maps each batch to its own `Arc<Mutex<BatchLog>>`
//! slot. The outer lock is held only to resolve or insert a slot; all
//! per-batch work serializes on the slot mutex, so appends to different
//! batches never contend. Both locks are `parking_lot` (non-poisoning)
//! and are never held across an `.await`; external ledger submission
//! happens entirely outside this crate.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use pel_core::{
    AnchorOutcome, AnchorState, BatchId, EventId, EventRecord, GeoPoint, Step, Timestamp,
    TransitionError, ValidationError,
};

/// Errors from store mutation operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with the given identifier exists in the given batch.
    #[error("unknown event {event_id} in batch {batch_id}")]
    UnknownEvent {
        /// The batch that was addressed.
        batch_id: BatchId,
        /// The event that was not found.
        event_id: EventId,
    },

    /// The anchor status transition was rejected.
    #[error("anchor transition rejected: {0}")]
    Transition(#[from] TransitionError),
}

/// A validated append request.
///
/// Construction performs all ingest validation (empty identifiers,
/// partial or out-of-range coordinates), so [`LedgerStore::append`]
/// itself cannot fail. An empty location label is normalized to absent.
#[derive(Debug, Clone)]
pub struct AppendRequest {
    batch_id: BatchId,
    step: Step,
    location: Option<String>,
    coords: Option<GeoPoint>,
}

impl AppendRequest {
    /// Validate raw ingest input into an append request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty/over-long batch identifier
    /// or step, a half-populated coordinate pair, or out-of-range
    /// coordinates.
    pub fn new(
        batch_id: impl Into<String>,
        step: impl Into<String>,
        location: Option<String>,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let batch_id = BatchId::new(batch_id)?;
        let step = Step::new(step)?;
        let coords = GeoPoint::from_parts(lat, lng)?;
        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        Ok(Self {
            batch_id,
            step,
            location,
            coords,
        })
    }

    /// The batch this request appends to.
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }
}

/// Address of a single record: batch plus event identifier.
///
/// Handed to status updates and manual re-anchoring so that callers
/// never hold a mutable reference into the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventRef {
    /// The batch the record belongs to.
    pub batch_id: BatchId,
    /// The record's identifier within that batch.
    pub event_id: EventId,
}

impl EventRef {
    /// Create a record address.
    pub fn new(batch_id: BatchId, event_id: EventId) -> Self {
        Self { batch_id, event_id }
    }

    /// The address of an existing record.
    pub fn of(record: &EventRecord) -> Self {
        Self {
            batch_id: record.batch_id.clone(),
            event_id: record.event_id,
        }
    }
}

/// The ordered event log of a single batch.
#[derive(Debug, Default)]
struct BatchLog {
    records: Vec<EventRecord>,
}

/// Pick the timestamp for the next record so per-batch timestamps never
/// decrease, even if the wall clock does.
fn next_timestamp(now: Timestamp, last: Option<Timestamp>) -> Timestamp {
    match last {
        Some(prev) if now <= prev => prev.tick(),
        _ => now,
    }
}

/// Append-only, in-process store of provenance events keyed by batch.
///
/// Initialized empty at process start; there is no persistence across
/// restarts. Cheap to share: clone the surrounding `Arc`.
#[derive(Debug, Default)]
pub struct LedgerStore {
    batches: RwLock<HashMap<BatchId, Arc<Mutex<BatchLog>>>>,
}

impl LedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the slot for a batch, if it exists.
    fn slot(&self, batch_id: &BatchId) -> Option<Arc<Mutex<BatchLog>>> {
        self.batches.read().get(batch_id).cloned()
    }

    /// Resolve the slot for a batch, creating it on first append.
    fn slot_or_insert(&self, batch_id: &BatchId) -> Arc<Mutex<BatchLog>> {
        if let Some(slot) = self.slot(batch_id) {
            return slot;
        }
        self.batches
            .write()
            .entry(batch_id.clone())
            .or_default()
            .clone()
    }

    /// Append a new event, returning the created record with
    /// `anchor_status = Pending`.
    ///
    /// Validation already happened in [`AppendRequest::new`]; the store
    /// assigns the event identifier, the dense sequence number, and the
    /// monotonic timestamp.
    pub fn append(&self, request: AppendRequest) -> EventRecord {
        let slot = self.slot_or_insert(&request.batch_id);
        let mut log = slot.lock();

        let timestamp = next_timestamp(
            Timestamp::now(),
            log.records.last().map(|r| r.timestamp),
        );
        let record = EventRecord {
            event_id: EventId::new(),
            batch_id: request.batch_id,
            sequence: log.records.len() as u64,
            step: request.step,
            location: request.location,
            coords: request.coords,
            timestamp,
            anchor_status: AnchorState::Pending,
            anchor_receipt_id: None,
        };
        log.records.push(record.clone());

        tracing::debug!(
            batch_id = %record.batch_id,
            event_id = %record.event_id,
            sequence = record.sequence,
            step = %record.step,
            "event appended"
        );
        record
    }

    /// Return all records for a batch in append order.
    ///
    /// An unknown batch yields an empty vector, never an error: "no
    /// history" is not a distinct entity.
    pub fn read(&self, batch_id: &BatchId) -> Vec<EventRecord> {
        match self.slot(batch_id) {
            Some(slot) => slot.lock().records.clone(),
            None => Vec::new(),
        }
    }

    /// Look up a single record by address.
    pub fn get(&self, event: &EventRef) -> Option<EventRecord> {
        let slot = self.slot(&event.batch_id)?;
        let log = slot.lock();
        log.records
            .iter()
            .find(|r| r.event_id == event.event_id)
            .cloned()
    }

    /// Apply a settled anchor outcome to a record, returning the updated
    /// record.
    ///
    /// Idempotent per the record's transition rules: re-confirming with
    /// the same receipt or re-failing a failed record is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownEvent`] when the address does not resolve;
    /// [`StoreError::Transition`] when the outcome would regress a
    /// confirmed anchor (logged at error level; this indicates a logic
    /// defect upstream, not a degraded environment).
    pub fn update_anchor_status(
        &self,
        event: &EventRef,
        outcome: &AnchorOutcome,
    ) -> Result<EventRecord, StoreError> {
        let slot = self.slot(&event.batch_id).ok_or_else(|| {
            StoreError::UnknownEvent {
                batch_id: event.batch_id.clone(),
                event_id: event.event_id,
            }
        })?;
        let mut log = slot.lock();
        let record = log
            .records
            .iter_mut()
            .find(|r| r.event_id == event.event_id)
            .ok_or_else(|| StoreError::UnknownEvent {
                batch_id: event.batch_id.clone(),
                event_id: event.event_id,
            })?;

        match record.apply_anchor_outcome(outcome) {
            Ok(changed) => {
                if changed {
                    tracing::debug!(
                        batch_id = %event.batch_id,
                        event_id = %event.event_id,
                        status = %record.anchor_status,
                        "anchor status updated"
                    );
                }
                Ok(record.clone())
            }
            Err(err) => {
                tracing::error!(
                    batch_id = %event.batch_id,
                    event_id = %event.event_id,
                    error = %err,
                    "rejected anchor status transition"
                );
                Err(err.into())
            }
        }
    }

    /// Number of batches with at least one record.
    pub fn batch_count(&self) -> usize {
        self.batches.read().len()
    }

    /// Total number of records across all batches.
    pub fn event_count(&self) -> usize {
        let slots: Vec<_> = self.batches.read().values().cloned().collect();
        slots.iter().map(|slot| slot.lock().records.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn request(batch: &str, step: &str) -> AppendRequest {
        AppendRequest::new(batch, step, None, None, None).unwrap()
    }

    // -- AppendRequest validation --------------------------------------------

    #[test]
    fn append_request_rejects_empty_batch() {
        let result = AppendRequest::new("", "Harvested", None, None, None);
        assert_eq!(result.unwrap_err(), ValidationError::EmptyBatchId);
    }

    #[test]
    fn append_request_rejects_empty_step() {
        let result = AppendRequest::new("BATCH-001", "  ", None, None, None);
        assert_eq!(result.unwrap_err(), ValidationError::EmptyStep);
    }

    #[test]
    fn append_request_rejects_partial_coords() {
        let result = AppendRequest::new("BATCH-001", "Harvested", None, Some(1.0), None);
        assert_eq!(result.unwrap_err(), ValidationError::PartialCoordinates);
    }

    #[test]
    fn append_request_rejects_out_of_range_coords() {
        let result =
            AppendRequest::new("BATCH-001", "Harvested", None, Some(95.0), Some(0.0));
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::LatitudeOutOfRange(_)
        ));
    }

    #[test]
    fn append_request_normalizes_empty_location() {
        let req =
            AppendRequest::new("BATCH-001", "Harvested", Some("   ".to_string()), None, None)
                .unwrap();
        assert!(req.location.is_none());
    }

    // -- Append & read -------------------------------------------------------

    #[test]
    fn append_then_read_returns_record_as_last() {
        let store = LedgerStore::new();
        store.append(request("BATCH-001", "Harvested"));
        let appended = store.append(request("BATCH-001", "Shipped"));

        let history = store.read(&appended.batch_id);
        assert_eq!(history.len(), 2);
        let last = history.last().unwrap();
        assert_eq!(last.event_id, appended.event_id);
        assert_eq!(last.sequence, 1);
        assert_eq!(last.anchor_status, AnchorState::Pending);
    }

    #[test]
    fn read_unknown_batch_is_empty_not_error() {
        let store = LedgerStore::new();
        let unknown = BatchId::new("NO-SUCH-BATCH").unwrap();
        assert!(store.read(&unknown).is_empty());
    }

    #[test]
    fn sequences_are_dense_per_batch() {
        let store = LedgerStore::new();
        for _ in 0..5 {
            store.append(request("BATCH-001", "Step"));
        }
        store.append(request("BATCH-002", "Other"));

        let batch_id = BatchId::new("BATCH-001").unwrap();
        let sequences: Vec<u64> = store.read(&batch_id).iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);

        let other = BatchId::new("BATCH-002").unwrap();
        assert_eq!(store.read(&other)[0].sequence, 0);
    }

    #[test]
    fn timestamps_never_decrease_within_batch() {
        let store = LedgerStore::new();
        for _ in 0..50 {
            store.append(request("BATCH-001", "Step"));
        }
        let batch_id = BatchId::new("BATCH-001").unwrap();
        let history = store.read(&batch_id);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn next_timestamp_ticks_past_regressed_clock() {
        let later: DateTime<Utc> = "2026-03-01T12:00:10Z".parse().unwrap();
        let earlier: DateTime<Utc> = "2026-03-01T12:00:05Z".parse().unwrap();
        let prev = Timestamp::from_datetime(later);

        // Wall clock went backward: next record lands at prev + 1µs.
        let assigned = next_timestamp(Timestamp::from_datetime(earlier), Some(prev));
        assert_eq!(assigned, prev.tick());

        // Wall clock equal to prev also ticks forward.
        let assigned = next_timestamp(prev, Some(prev));
        assert_eq!(assigned, prev.tick());

        // Healthy clock passes through untouched.
        let now = Timestamp::from_datetime("2026-03-01T12:00:11Z".parse().unwrap());
        assert_eq!(next_timestamp(now, Some(prev)), now);
        assert_eq!(next_timestamp(now, None), now);
    }

    // -- Anchor status updates -----------------------------------------------

    #[test]
    fn update_confirmed_sets_receipt() {
        let store = LedgerStore::new();
        let record = store.append(request("BATCH-001", "Harvested"));
        let updated = store
            .update_anchor_status(
                &EventRef::of(&record),
                &AnchorOutcome::Confirmed {
                    receipt_id: "R1".to_string(),
                },
            )
            .unwrap();
        assert_eq!(updated.anchor_status, AnchorState::Confirmed);
        assert_eq!(updated.anchor_receipt_id.as_deref(), Some("R1"));

        // Visible through read as well.
        let history = store.read(&record.batch_id);
        assert_eq!(history[0].anchor_status, AnchorState::Confirmed);
    }

    #[test]
    fn update_confirmed_twice_is_idempotent() {
        let store = LedgerStore::new();
        let record = store.append(request("BATCH-001", "Harvested"));
        let outcome = AnchorOutcome::Confirmed {
            receipt_id: "R1".to_string(),
        };
        let event = EventRef::of(&record);
        let first = store.update_anchor_status(&event, &outcome).unwrap();
        let second = store.update_anchor_status(&event, &outcome).unwrap();
        assert_eq!(first.anchor_status, second.anchor_status);
        assert_eq!(first.anchor_receipt_id, second.anchor_receipt_id);
    }

    #[test]
    fn update_failed_after_confirmed_is_rejected() {
        let store = LedgerStore::new();
        let record = store.append(request("BATCH-001", "Harvested"));
        let event = EventRef::of(&record);
        store
            .update_anchor_status(
                &event,
                &AnchorOutcome::Confirmed {
                    receipt_id: "R1".to_string(),
                },
            )
            .unwrap();

        let err = store
            .update_anchor_status(&event, &AnchorOutcome::Failed)
            .unwrap_err();
        assert!(matches!(err, StoreError::Transition(_)));
        assert_eq!(
            store.get(&event).unwrap().anchor_status,
            AnchorState::Confirmed
        );
    }

    #[test]
    fn update_unknown_event_is_rejected() {
        let store = LedgerStore::new();
        let record = store.append(request("BATCH-001", "Harvested"));
        let bogus = EventRef::new(record.batch_id.clone(), EventId::new());
        let err = store
            .update_anchor_status(&bogus, &AnchorOutcome::Failed)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownEvent { .. }));

        let unknown_batch = EventRef::new(BatchId::new("GHOST").unwrap(), record.event_id);
        assert!(matches!(
            store
                .update_anchor_status(&unknown_batch, &AnchorOutcome::Failed)
                .unwrap_err(),
            StoreError::UnknownEvent { .. }
        ));
    }

    // -- Concurrency ---------------------------------------------------------

    #[test]
    fn concurrent_appends_same_batch_keep_invariants() {
        let store = Arc::new(LedgerStore::new());
        let threads = 8;
        let per_thread = 25;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        store.append(request("BATCH-002", &format!("step-{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let batch_id = BatchId::new("BATCH-002").unwrap();
        let history = store.read(&batch_id);
        assert_eq!(history.len(), threads * per_thread);

        // No reordering, duplication, or loss: sequences dense, ids unique,
        // timestamps non-decreasing.
        for (i, record) in history.iter().enumerate() {
            assert_eq!(record.sequence, i as u64);
        }
        let mut ids: Vec<_> = history.iter().map(|r| r.event_id).collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids.dedup();
        assert_eq!(ids.len(), threads * per_thread);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn two_concurrent_appends_both_present_exactly_once() {
        let store = Arc::new(LedgerStore::new());
        let a = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.append(request("BATCH-003", "Shipped")))
        };
        let b = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.append(request("BATCH-003", "Delivered")))
        };
        a.join().unwrap();
        b.join().unwrap();

        let batch_id = BatchId::new("BATCH-003").unwrap();
        let history = store.read(&batch_id);
        assert_eq!(history.len(), 2);
        let steps: Vec<&str> = history.iter().map(|r| r.step.as_str()).collect();
        assert!(steps.contains(&"Shipped"));
        assert!(steps.contains(&"Delivered"));
        assert_eq!(history[0].sequence, 0);
        assert_eq!(history[1].sequence, 1);
    }

    // -- Counters ------------------------------------------------------------

    #[test]
    fn counts_track_batches_and_events() {
        let store = LedgerStore::new();
        assert_eq!(store.batch_count(), 0);
        assert_eq!(store.event_count(), 0);

        store.append(request("BATCH-001", "Harvested"));
        store.append(request("BATCH-001", "Shipped"));
        store.append(request("BATCH-002", "Harvested"));
        assert_eq!(store.batch_count(), 2);
        assert_eq!(store.event_count(), 3);
    }
}
