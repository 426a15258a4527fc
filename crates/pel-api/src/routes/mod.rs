//! API route modules.
//!
//! - [`events`] — event ingestion and manual re-anchoring
//! - [`history`] — batch history queries

pub mod events;
pub mod history;
