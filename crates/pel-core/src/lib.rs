#![deny(missing_docs)]

//! # pel-core — Foundational Types for the Provenance Event Ledger
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies; only `serde`, `thiserror`,
//! `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`BatchId`] is not a
//!    [`Step`], and neither is a bare `String`. Validation happens at
//!    construction time, so a constructed identifier is always well-formed.
//!
//! 2. **The anchor status state machine lives on the record.**
//!    [`EventRecord::apply_anchor_outcome`] is the only way an anchor
//!    status changes, and it enforces the legal transitions (a confirmed
//!    anchor never regresses to failed).
//!
//! 3. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod batch;
pub mod error;
pub mod event;
pub mod geo;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use batch::{BatchId, Step};
pub use error::{TransitionError, ValidationError};
pub use event::{AnchorOutcome, AnchorState, EventId, EventRecord};
pub use geo::GeoPoint;
pub use temporal::Timestamp;
