//! # pel-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the Provenance Event Ledger.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use pel_anchor::{AnchorClient, AnchorConfig, AnchorPolicy, HttpAnchorClient, MockAnchorClient};
use pel_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let config = AppConfig { port };

    // Anchor client: the ledger gateway when configured, otherwise the
    // in-process mock. Anchoring is an add-on; a missing gateway must
    // not keep the local ledger from serving.
    let policy = AnchorPolicy::from_env();
    let client: Arc<dyn AnchorClient> = match AnchorConfig::from_env() {
        Ok(anchor_config) => {
            tracing::info!(
                gateway = %anchor_config.gateway_url,
                topic = %anchor_config.topic_id,
                network = %anchor_config.network,
                "ledger gateway configured"
            );
            Arc::new(HttpAnchorClient::new(&anchor_config).map_err(|e| {
                tracing::error!("Failed to create ledger gateway client: {e}");
                e
            })?)
        }
        Err(e) => {
            tracing::warn!(
                "Ledger gateway not configured: {e}. Events will be anchored to an \
                 in-process mock ledger with no tamper-evidence."
            );
            Arc::new(MockAnchorClient::new())
        }
    };

    let state = AppState::new(client, policy, config);
    let app = pel_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Provenance Event Ledger API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
