//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The store is the single source of truth; the coordinator and the
//! history service are two disciplined views over it: one write path
//! with anchoring and one pure read path. Handlers never touch the store
//! directly.

use std::sync::Arc;

use pel_anchor::{AnchorClient, AnchorPolicy, AnchoringCoordinator, MockAnchorClient};
use pel_ledger::{HistoryService, LedgerStore};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: every field is an `Arc` (or wraps one).
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local event store. Held for observability probes; all
    /// request-path access goes through the coordinator or the history
    /// service.
    pub store: Arc<LedgerStore>,
    /// Write path: local append plus anchoring.
    pub coordinator: Arc<AnchoringCoordinator>,
    /// Read path: batch history queries.
    pub history: HistoryService,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Assemble application state around the given anchor client.
    pub fn new(
        client: Arc<dyn AnchorClient>,
        policy: AnchorPolicy,
        config: AppConfig,
    ) -> Self {
        let store = Arc::new(LedgerStore::new());
        let coordinator = Arc::new(AnchoringCoordinator::new(
            Arc::clone(&store),
            client,
            policy,
        ));
        let history = HistoryService::new(Arc::clone(&store));
        Self {
            store,
            coordinator,
            history,
            config,
        }
    }

    /// State backed by the in-process mock anchor client.
    ///
    /// Used when no ledger gateway is configured, and by tests.
    pub fn with_mock_anchor() -> Self {
        Self::new(
            Arc::new(MockAnchorClient::new()),
            AnchorPolicy::default(),
            AppConfig::default(),
        )
    }
}
