//! # Batch & Step Newtypes
//!
//! Domain-primitive newtypes for the two caller-supplied identifiers in a
//! provenance event. Both are validated at construction time: a
//! constructed [`BatchId`] or [`Step`] is always non-empty and within
//! length limits, so downstream code never re-checks.
//!
//! Input is trimmed before validation: `" BATCH-001 "` and `"BATCH-001"`
//! address the same batch.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of a provenance chain: a logical supply-chain unit whose
/// lifecycle is a sequence of events.
///
/// # Validation
///
/// Must be non-empty after trimming and at most
/// [`BatchId::MAX_LEN`] characters. No further format restrictions are
/// imposed because batch naming schemes vary across producers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(String);

impl BatchId {
    /// Maximum accepted length, in bytes, after trimming.
    pub const MAX_LEN: usize = 128;

    /// Create a batch identifier, validating non-emptiness and length.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBatchId`] for empty or
    /// whitespace-only input, [`ValidationError::BatchIdTooLong`] when the
    /// trimmed input exceeds [`BatchId::MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyBatchId);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::BatchIdTooLong {
                actual: trimmed.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the batch identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-text lifecycle stage label ("Harvested", "Shipped", …).
///
/// # Validation
///
/// Must be non-empty after trimming and at most [`Step::MAX_LEN`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step(String);

impl Step {
    /// Maximum accepted length, in bytes, after trimming.
    pub const MAX_LEN: usize = 255;

    /// Create a step label, validating non-emptiness and length.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyStep`] for empty or whitespace-only
    /// input, [`ValidationError::StepTooLong`] when the trimmed input
    /// exceeds [`Step::MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyStep);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::StepTooLong {
                actual: trimmed.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the step label string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_id_valid() {
        let id = BatchId::new("BATCH-001").unwrap();
        assert_eq!(id.as_str(), "BATCH-001");
    }

    #[test]
    fn batch_id_trims_whitespace() {
        let id = BatchId::new("  BATCH-001  ").unwrap();
        assert_eq!(id.as_str(), "BATCH-001");
    }

    #[test]
    fn batch_id_rejects_empty() {
        assert_eq!(BatchId::new(""), Err(ValidationError::EmptyBatchId));
        assert_eq!(BatchId::new("   "), Err(ValidationError::EmptyBatchId));
    }

    #[test]
    fn batch_id_rejects_over_long() {
        let long = "x".repeat(BatchId::MAX_LEN + 1);
        assert!(matches!(
            BatchId::new(long),
            Err(ValidationError::BatchIdTooLong { .. })
        ));
    }

    #[test]
    fn batch_id_accepts_max_length() {
        let max = "x".repeat(BatchId::MAX_LEN);
        assert!(BatchId::new(max).is_ok());
    }

    #[test]
    fn step_valid() {
        let step = Step::new("Harvested").unwrap();
        assert_eq!(step.as_str(), "Harvested");
    }

    #[test]
    fn step_rejects_empty() {
        assert_eq!(Step::new("  "), Err(ValidationError::EmptyStep));
    }

    #[test]
    fn step_rejects_over_long() {
        let long = "s".repeat(Step::MAX_LEN + 1);
        assert!(matches!(
            Step::new(long),
            Err(ValidationError::StepTooLong { .. })
        ));
    }

    #[test]
    fn serde_transparent_round_trip() {
        let id = BatchId::new("BATCH-007").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"BATCH-007\"");
        let back: BatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
