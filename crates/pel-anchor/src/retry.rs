//! Exponential backoff policy for anchor resubmission.
//!
//! Retries apply only to transient failures (unreachable ledger,
//! timeouts). Rejections are never retried: the same payload cannot
//! start succeeding without an upstream change.

use std::time::Duration;

/// Backoff schedule for anchor retries.
///
/// `max_attempts` counts every submission of a payload, including the
/// first awaited attempt on the ingest path. With the defaults
/// (5 attempts, 1s base) a failing event is retried after 1s, 2s, 4s, 8s
/// and then left `Failed` permanently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total submission budget per anchoring run, including the first
    /// attempt. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each retry after that.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry_index` (0-based).
    ///
    /// `base_delay * 2^retry_index`, with the shift capped so pathological
    /// configurations cannot overflow.
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let factor = 1u32 << retry_index.min(16);
        self.base_delay * factor
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}
