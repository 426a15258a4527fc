//! # pel-ledger — Local Event Log
//!
//! The source of truth for batch histories. Two components:
//!
//! - **Store** ([`store`]): append-only, in-process storage of
//!   [`pel_core::EventRecord`]s keyed by batch identifier, with per-batch
//!   ordering and monotonic-timestamp guarantees.
//!
//! - **History** ([`query`]): the read path. Resolves a raw batch
//!   identifier and returns the ordered event sequence as typed views
//!   with anchor status attached.
//!
//! Anchoring is a separate concern: this crate records and mutates anchor
//! status but never talks to the external ledger.

pub mod query;
pub mod store;

// Re-export primary types.
pub use query::{EventView, HistoryService};
pub use store::{AppendRequest, EventRef, LedgerStore, StoreError};
