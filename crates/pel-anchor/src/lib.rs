//! # pel-anchor — External Ledger Anchoring
//!
//! Mirrors each locally stored provenance event onto an external,
//! append-only, consensus-ordered ledger for tamper-evidence.
//!
//! ## Design Decision: The Anchor Is an Add-On
//!
//! Local durability never waits on the external ledger. The coordinator
//! appends to the local store first, then drives anchor submission (one
//! awaited attempt plus detached background retries) and records the
//! outcome as a per-event status. A degraded or unreachable ledger slows
//! down nothing and fails nothing on the ingest path.
//!
//! ## Architecture
//!
//! - [`AnchorClient`]: capability trait over the concrete ledger backend.
//!   Network selection, credentials, and topic addressing are adapter
//!   configuration, never inspected by the coordinator.
//! - [`HttpAnchorClient`]: gateway adapter speaking JSON over HTTP with a
//!   bounded request timeout.
//! - [`MockAnchorClient`]: in-process adapter for development and tests.
//! - [`AnchoringCoordinator`]: the dual-write orchestrator and per-event
//!   retry state machine.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod http;
pub mod payload;
pub mod retry;

// Re-export primary types.
pub use client::{AnchorClient, AnchorError, AnchorReceipt, MockAnchorClient};
pub use config::{AnchorConfig, AnchorPolicy, ConfigError, LedgerNetwork};
pub use coordinator::{AnchoringCoordinator, ReanchorError};
pub use http::HttpAnchorClient;
pub use payload::AnchorPayload;
pub use retry::RetryPolicy;
