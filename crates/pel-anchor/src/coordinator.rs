//! # Anchoring Coordinator
//!
//! Orchestrates the dual-write: append to the local store synchronously,
//! then drive anchor submission against the [`AnchorClient`], updating the
//! record's anchor status as attempts settle.
//!
//! ## Per-Event State Machine
//!
//! ```text
//! append ──▶ locally stored (Pending)
//!                 │ submit
//!        ┌────────┴─────────┐
//!     receipt            failure
//!        │                  │
//!        ▼                  ▼
//!    Confirmed           Failed ──transient──▶ background retries
//!                           │                       │
//!                           │ rejected          receipt │ exhausted
//!                           ▼                       ▼   ▼
//!                      stays Failed          Confirmed  stays Failed
//! ```
//!
//! The local append is the only step that gates the caller's success.
//! Anchor failures are observable solely through the record's status;
//! they never fail the ingest call.

use std::sync::Arc;

use thiserror::Error;

use pel_core::{AnchorOutcome, AnchorState, BatchId, EventId, EventRecord};
use pel_ledger::{AppendRequest, EventRef, LedgerStore};

use crate::client::{AnchorClient, AnchorError, AnchorReceipt};
use crate::config::AnchorPolicy;
use crate::payload::AnchorPayload;

/// Errors from operator-initiated re-anchoring.
#[derive(Error, Debug)]
pub enum ReanchorError {
    /// The addressed record does not exist.
    #[error("unknown event {event_id} in batch {batch_id}")]
    UnknownEvent {
        /// The batch that was addressed.
        batch_id: BatchId,
        /// The event that was not found.
        event_id: EventId,
    },

    /// Only records whose last anchor attempt failed can be re-anchored.
    #[error("event {event_id} is {status}, only failed events can be re-anchored")]
    NotFailed {
        /// The addressed event.
        event_id: EventId,
        /// Its current anchor status.
        status: AnchorState,
    },
}

/// The dual-write orchestrator.
///
/// Holds the store, the anchor client capability, and the submission
/// policy. Cheap to clone behind an `Arc` in application state; retry
/// tasks are detached, so dropping the coordinator does not cancel
/// in-flight retries (process shutdown does, which is safe: records stay
/// `Failed` and resubmission after restart is idempotent).
pub struct AnchoringCoordinator {
    store: Arc<LedgerStore>,
    client: Arc<dyn AnchorClient>,
    policy: AnchorPolicy,
}

impl std::fmt::Debug for AnchoringCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchoringCoordinator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AnchoringCoordinator {
    /// Create a coordinator over the given store and anchor client.
    pub fn new(
        store: Arc<LedgerStore>,
        client: Arc<dyn AnchorClient>,
        policy: AnchorPolicy,
    ) -> Self {
        Self {
            store,
            client,
            policy,
        }
    }

    /// Append an event and drive its anchoring.
    ///
    /// Returns once the local append and the first submit attempt have
    /// settled; transient failures continue retrying in the background.
    /// The returned record reflects the anchor status as of the first
    /// attempt (`Confirmed`, or `Failed` with retries possibly pending).
    pub async fn append(&self, request: AppendRequest) -> EventRecord {
        let record = self.store.append(request);
        let event = EventRef::of(&record);

        let payload = match AnchorPayload::from(&record).to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                // Unanchorable content is equivalent to a rejection: the
                // same bytes would fail every retry.
                tracing::error!(
                    event_id = %event.event_id,
                    error = %err,
                    "failed to serialize anchor payload"
                );
                return self.settle(&event, &AnchorOutcome::Failed).unwrap_or(record);
            }
        };

        match submit_bounded(self.client.as_ref(), &payload, &self.policy).await {
            Ok(receipt) => {
                tracing::info!(
                    batch_id = %event.batch_id,
                    event_id = %event.event_id,
                    receipt_id = %receipt.receipt_id,
                    "event anchored"
                );
                self.settle(&event, &confirmed(receipt)).unwrap_or(record)
            }
            Err(err) => {
                let updated = self.settle(&event, &AnchorOutcome::Failed).unwrap_or(record);
                if err.is_transient() {
                    tracing::warn!(
                        batch_id = %event.batch_id,
                        event_id = %event.event_id,
                        error = %err,
                        "anchor submission failed, scheduling retries"
                    );
                    self.spawn_retries(event, payload);
                } else {
                    tracing::warn!(
                        batch_id = %event.batch_id,
                        event_id = %event.event_id,
                        error = %err,
                        "anchor submission rejected, not retrying"
                    );
                }
                updated
            }
        }
    }

    /// Re-drive anchoring for a record whose last attempt failed.
    ///
    /// Resubmits the same serialized payload through the full attempt +
    /// retry pipeline. Returns the record as of the first re-attempt.
    ///
    /// # Errors
    ///
    /// [`ReanchorError::UnknownEvent`] when the address does not resolve,
    /// [`ReanchorError::NotFailed`] when the record is `Pending` or
    /// already `Confirmed`.
    pub async fn reanchor(&self, event: &EventRef) -> Result<EventRecord, ReanchorError> {
        let record = self
            .store
            .get(event)
            .ok_or_else(|| ReanchorError::UnknownEvent {
                batch_id: event.batch_id.clone(),
                event_id: event.event_id,
            })?;
        if record.anchor_status != AnchorState::Failed {
            return Err(ReanchorError::NotFailed {
                event_id: event.event_id,
                status: record.anchor_status,
            });
        }

        tracing::info!(
            batch_id = %event.batch_id,
            event_id = %event.event_id,
            "manual re-anchor requested"
        );
        let payload = match AnchorPayload::from(&record).to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(
                    event_id = %event.event_id,
                    error = %err,
                    "failed to serialize anchor payload"
                );
                return Ok(record);
            }
        };

        match submit_bounded(self.client.as_ref(), &payload, &self.policy).await {
            Ok(receipt) => Ok(self.settle(event, &confirmed(receipt)).unwrap_or(record)),
            Err(err) => {
                if err.is_transient() {
                    tracing::warn!(
                        event_id = %event.event_id,
                        error = %err,
                        "re-anchor attempt failed, scheduling retries"
                    );
                    self.spawn_retries(event.clone(), payload);
                } else {
                    tracing::warn!(
                        event_id = %event.event_id,
                        error = %err,
                        "re-anchor attempt rejected, not retrying"
                    );
                }
                Ok(self.store.get(event).unwrap_or(record))
            }
        }
    }

    /// Apply a settled outcome, returning the updated record.
    ///
    /// Transition rejections are logged by the store and swallowed here:
    /// by the time a late confirmation loses a race, the record already
    /// carries an authoritative status.
    fn settle(&self, event: &EventRef, outcome: &AnchorOutcome) -> Option<EventRecord> {
        self.store.update_anchor_status(event, outcome).ok()
    }

    /// Spawn the detached backoff loop for a transiently failed event.
    ///
    /// Attempt 1 was the awaited submit; the loop continues from attempt 2
    /// up to the policy budget, then leaves the record `Failed`.
    fn spawn_retries(&self, event: EventRef, payload: Vec<u8>) {
        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);
        let policy = self.policy;

        tokio::spawn(async move {
            for attempt in 2..=policy.retry.max_attempts {
                tokio::time::sleep(policy.retry.delay_for(attempt - 2)).await;

                match submit_bounded(client.as_ref(), &payload, &policy).await {
                    Ok(receipt) => {
                        tracing::info!(
                            batch_id = %event.batch_id,
                            event_id = %event.event_id,
                            receipt_id = %receipt.receipt_id,
                            attempt,
                            "event anchored on retry"
                        );
                        let _ = store.update_anchor_status(&event, &confirmed(receipt));
                        return;
                    }
                    Err(err) if err.is_transient() => {
                        tracing::debug!(
                            event_id = %event.event_id,
                            attempt,
                            max_attempts = policy.retry.max_attempts,
                            error = %err,
                            "anchor retry failed"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(
                            event_id = %event.event_id,
                            attempt,
                            error = %err,
                            "anchor submission rejected during retry, giving up"
                        );
                        return;
                    }
                }
            }
            tracing::warn!(
                batch_id = %event.batch_id,
                event_id = %event.event_id,
                attempts = policy.retry.max_attempts,
                "anchor retries exhausted, event remains failed"
            );
        });
    }
}

fn confirmed(receipt: AnchorReceipt) -> AnchorOutcome {
    AnchorOutcome::Confirmed {
        receipt_id: receipt.receipt_id,
    }
}

/// One submit attempt bounded by the policy timeout.
async fn submit_bounded(
    client: &dyn AnchorClient,
    payload: &[u8],
    policy: &AnchorPolicy,
) -> Result<AnchorReceipt, AnchorError> {
    match tokio::time::timeout(policy.submit_timeout, client.submit(payload)).await {
        Ok(result) => result,
        Err(_) => Err(AnchorError::Timeout {
            elapsed_ms: policy.submit_timeout.as_millis() as u64,
        }),
    }
}
