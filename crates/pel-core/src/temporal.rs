//! # Temporal Types
//!
//! UTC-only timestamp type for the provenance event ledger. Event
//! timestamps are assigned by the local store, not by callers, so a single
//! unambiguous representation is enough: UTC with microsecond precision.
//!
//! ## Design Decision
//!
//! Batch histories are compared and ordered across parties in different
//! time zones. To keep the per-batch ordering invariant meaningful, all
//! timestamps are UTC; local time conversion is a presentation concern.
//! Precision is capped at microseconds, the same granularity as the
//! store's monotonicity tick, so the serialized form is lossless and a
//! resubmitted anchor payload carries identical bytes.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A UTC timestamp with microsecond precision.
///
/// Serializes to RFC 3339 with a `Z` suffix and exactly six fractional
/// digits. Ordering follows the underlying instant, which the local store
/// uses to enforce per-batch monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current UTC time, truncated to
    /// microsecond precision.
    pub fn now() -> Self {
        let now = Utc::now();
        let truncated = now
            .with_nanosecond(now.nanosecond() / 1_000 * 1_000)
            .unwrap_or(now);
        Self(truncated)
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Return the smallest representable instant after this one.
    ///
    /// Used by the store when the wall clock reads at or before the
    /// previous record's timestamp: the new record gets `previous + 1µs`
    /// so per-batch timestamps never regress.
    pub fn tick(&self) -> Self {
        Self(self.0 + chrono::Duration::microseconds(1))
    }

    /// Return the timestamp as an RFC 3339 string with `Z` suffix and
    /// microsecond precision.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
