//! # Anchor Client Capability
//!
//! The interface the coordinator holds against the external consensus
//! ledger. Implementations submit an opaque payload and return a receipt
//! proving inclusion; everything backend-specific (network, credentials,
//! topic addressing, signing) lives inside the adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pel_core::Timestamp;

/// Errors from anchor submission.
///
/// The distinction that matters downstream is transience:
/// [`AnchorError::Unreachable`] and [`AnchorError::Timeout`] are retried,
/// [`AnchorError::Rejected`] is not: a payload the ledger refused once
/// will be refused again without an upstream change.
#[derive(Error, Debug)]
pub enum AnchorError {
    /// The ledger (or its gateway) could not be reached.
    #[error("ledger unreachable: {reason}")]
    Unreachable {
        /// Transport-level failure description.
        reason: String,
    },

    /// The ledger refused the submission (e.g. malformed payload,
    /// unauthorized topic).
    #[error("submission rejected by ledger: {reason}")]
    Rejected {
        /// The ledger's refusal description.
        reason: String,
    },

    /// The submission did not settle within the bounded timeout.
    #[error("submission timed out after {elapsed_ms}ms")]
    Timeout {
        /// The enforced bound, in milliseconds.
        elapsed_ms: u64,
    },
}

impl AnchorError {
    /// Whether a retry of the same payload can possibly succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Receipt of a successful anchor submission.
///
/// Opaque to the coordinator beyond the receipt identifier; the consensus
/// timestamp and sequence number are carried through when the backend
/// reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// Opaque receipt identifier assigned by the ledger.
    pub receipt_id: String,
    /// Consensus timestamp, when reported.
    pub consensus_at: Option<Timestamp>,
    /// Position in the ledger's total order, when reported.
    pub sequence_number: Option<u64>,
}

/// Capability trait over a concrete external ledger backend.
///
/// `submit` is the only suspension point in the anchoring path. It must
/// never be called while holding store locks; the coordinator guarantees
/// this by submitting strictly after local append returns.
#[async_trait]
pub trait AnchorClient: Send + Sync {
    /// Submit a serialized event payload to the ledger.
    ///
    /// Returns a receipt only once the payload is durably recorded.
    async fn submit(&self, payload: &[u8]) -> Result<AnchorReceipt, AnchorError>;
}

/// In-process anchor client for development and testing.
///
/// Every submission succeeds immediately with a deterministic receipt
/// identifier from an atomic counter. Provides NO tamper-evidence; it
/// exists so the service runs without any external ledger dependency.
#[derive(Debug, Default)]
pub struct MockAnchorClient {
    next_sequence: std::sync::atomic::AtomicU64,
}

impl MockAnchorClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnchorClient for MockAnchorClient {
    async fn submit(&self, _payload: &[u8]) -> Result<AnchorReceipt, AnchorError> {
        let sequence = self
            .next_sequence
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1;
        Ok(AnchorReceipt {
            receipt_id: format!("mock-receipt-{sequence:06}"),
            consensus_at: Some(Timestamp::now()),
            sequence_number: Some(sequence),
        })
    }
}
