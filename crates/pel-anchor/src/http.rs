//! HTTP gateway adapter for the external consensus ledger.
//!
//! Speaks plain JSON to a ledger gateway that owns the chain-specific
//! concerns (signing, fee payment, consensus submission). The adapter's
//! job is narrow: deliver the payload to the configured topic, classify
//! the failure modes, and hand back the receipt.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use pel_core::Timestamp;

use crate::client::{AnchorClient, AnchorError, AnchorReceipt};
use crate::config::{AnchorConfig, ConfigError, LedgerNetwork};

/// Gateway response body for a successful topic submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    receipt_id: String,
    consensus_at: Option<Timestamp>,
    sequence_number: Option<u64>,
}

/// [`AnchorClient`] implementation backed by a ledger gateway over HTTP.
///
/// The request timeout is configured on the underlying client from
/// [`AnchorConfig::policy`], so a hung gateway surfaces as
/// [`AnchorError::Timeout`] rather than an indefinite stall.
#[derive(Debug, Clone)]
pub struct HttpAnchorClient {
    http: reqwest::Client,
    submit_url: Url,
    operator_id: String,
    operator_key: String,
    network: LedgerNetwork,
    timeout_ms: u64,
}

impl HttpAnchorClient {
    /// Build the adapter from anchoring configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the submit URL cannot be derived from
    /// the gateway base and topic, or the HTTP client fails to build.
    pub fn new(config: &AnchorConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.policy.submit_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let submit_url = config
            .gateway_url
            .join(&format!("v1/topics/{}/messages", config.topic_id))
            .map_err(|e| ConfigError::InvalidUrl {
                var: "LEDGER_TOPIC_ID",
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            submit_url,
            operator_id: config.operator_id.clone(),
            operator_key: config.operator_key.clone(),
            network: config.network,
            timeout_ms: config.policy.submit_timeout.as_millis() as u64,
        })
    }

    /// The resolved topic submission URL.
    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }
}

#[async_trait]
impl AnchorClient for HttpAnchorClient {
    async fn submit(&self, payload: &[u8]) -> Result<AnchorReceipt, AnchorError> {
        let response = self
            .http
            .post(self.submit_url.clone())
            .bearer_auth(&self.operator_key)
            .header("X-Operator-Id", &self.operator_id)
            .header("X-Ledger-Network", self.network.to_string())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AnchorError::Timeout {
                        elapsed_ms: self.timeout_ms,
                    }
                } else {
                    AnchorError::Unreachable {
                        reason: err.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: SubmitResponse =
                response.json().await.map_err(|err| AnchorError::Unreachable {
                    reason: format!("malformed gateway response: {err}"),
                })?;
            return Ok(AnchorReceipt {
                receipt_id: body.receipt_id,
                consensus_at: body.consensus_at,
                sequence_number: body.sequence_number,
            });
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            // The gateway understood the request and refused it; retrying
            // the same bytes cannot succeed.
            Err(AnchorError::Rejected {
                reason: format!("{status}: {body}"),
            })
        } else {
            Err(AnchorError::Unreachable {
                reason: format!("{status}: {body}"),
            })
        }
    }
}
