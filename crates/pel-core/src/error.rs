//! # Error Hierarchy
//!
//! Structured error types for the provenance event ledger, built with
//! `thiserror`. Each variant carries the invalid input or the state at the
//! time of failure so that callers can diagnose rejections without
//! guesswork.

use thiserror::Error;

use crate::event::{AnchorState, EventId};

/// Validation errors for ingest input and domain primitive newtypes.
///
/// These are surfaced immediately to the caller and never retried;
/// a rejected input stays rejected until the caller changes it.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Batch identifier is empty or whitespace-only.
    #[error("invalid batch ID: must be non-empty")]
    EmptyBatchId,

    /// Batch identifier exceeds the maximum length.
    #[error("invalid batch ID: {actual} characters exceeds the maximum of {max}")]
    BatchIdTooLong {
        /// Length of the rejected identifier.
        actual: usize,
        /// The enforced maximum.
        max: usize,
    },

    /// Lifecycle step is empty or whitespace-only.
    #[error("invalid step: must be non-empty")]
    EmptyStep,

    /// Lifecycle step exceeds the maximum length.
    #[error("invalid step: {actual} characters exceeds the maximum of {max}")]
    StepTooLong {
        /// Length of the rejected step.
        actual: usize,
        /// The enforced maximum.
        max: usize,
    },

    /// Exactly one of latitude/longitude was provided.
    #[error("partial coordinates: latitude and longitude must both be present or both be absent")]
    PartialCoordinates,

    /// Latitude outside the valid range.
    #[error("latitude out of range: {0} (expected -90.0..=90.0)")]
    LatitudeOutOfRange(f64),

    /// Longitude outside the valid range.
    #[error("longitude out of range: {0} (expected -180.0..=180.0)")]
    LongitudeOutOfRange(f64),
}

/// Errors from the anchor status state machine.
///
/// A transition error is a programming-fault signal: the coordinator only
/// produces legal transitions, so an illegal one indicates a logic defect
/// or a duplicated/conflicting confirmation. The operation is rejected and
/// the record is left unchanged.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// The attempted anchor status transition is not permitted.
    #[error("invalid anchor transition for event {event_id}: {from} -> {to}: {reason}")]
    InvalidTransition {
        /// The event whose status was being updated.
        event_id: EventId,
        /// The current anchor status.
        from: AnchorState,
        /// The attempted target status.
        to: AnchorState,
        /// Human-readable reason for the rejection.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_batch_display() {
        let msg = format!("{}", ValidationError::EmptyBatchId);
        assert!(msg.contains("non-empty"));
    }

    #[test]
    fn validation_error_partial_coords_display() {
        let msg = format!("{}", ValidationError::PartialCoordinates);
        assert!(msg.contains("both"));
    }

    #[test]
    fn validation_error_latitude_display_carries_value() {
        let msg = format!("{}", ValidationError::LatitudeOutOfRange(91.5));
        assert!(msg.contains("91.5"));
    }

    #[test]
    fn transition_error_display_carries_states() {
        let err = TransitionError::InvalidTransition {
            event_id: EventId::new(),
            from: AnchorState::Confirmed,
            to: AnchorState::Failed,
            reason: "a confirmed anchor cannot regress".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Confirmed"));
        assert!(msg.contains("Failed"));
        assert!(msg.contains("regress"));
    }
}
