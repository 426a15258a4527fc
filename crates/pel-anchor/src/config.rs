//! Anchoring configuration.
//!
//! Everything backend-specific about the external ledger (gateway
//! address, network, topic, operator credentials) plus the submission
//! policy (timeout and retry schedule). Loaded from the environment;
//! explicit construction is available for tests.

use std::time::Duration;

use url::Url;

use crate::retry::RetryPolicy;

/// Which consensus network the anchor targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerNetwork {
    /// The production network.
    #[default]
    Mainnet,
    /// The public test network.
    Testnet,
}

impl std::str::FromStr for LedgerNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

impl std::fmt::Display for LedgerNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

/// Submission policy: how long one attempt may take and how failures are
/// retried. Independent of any concrete backend, so it applies to the
/// mock client as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPolicy {
    /// Bound on a single submit attempt.
    pub submit_timeout: Duration,
    /// Backoff schedule for transient failures.
    pub retry: RetryPolicy,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl AnchorPolicy {
    /// Load the policy from the environment, falling back to defaults for
    /// absent or unparseable values.
    ///
    /// Variables:
    /// - `ANCHOR_SUBMIT_TIMEOUT_MS` (default: 10000)
    /// - `ANCHOR_MAX_ATTEMPTS` (default: 5)
    /// - `ANCHOR_BASE_DELAY_MS` (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            submit_timeout: env_parse("ANCHOR_SUBMIT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.submit_timeout),
            retry: RetryPolicy {
                max_attempts: env_parse("ANCHOR_MAX_ATTEMPTS")
                    .filter(|&n: &u32| n >= 1)
                    .unwrap_or(defaults.retry.max_attempts),
                base_delay: env_parse("ANCHOR_BASE_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.base_delay),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|raw| raw.parse().ok())
}

/// Connection settings for the external ledger gateway.
///
/// Custom `Debug` redacts the operator key to prevent credential leakage
/// in log output.
#[derive(Clone)]
pub struct AnchorConfig {
    /// Base URL of the ledger gateway.
    pub gateway_url: Url,
    /// Target topic the events are submitted to.
    pub topic_id: String,
    /// Consensus network selection.
    pub network: LedgerNetwork,
    /// Operator account identifier.
    pub operator_id: String,
    /// Operator credential presented to the gateway.
    pub operator_key: String,
    /// Submission policy.
    pub policy: AnchorPolicy,
}

impl std::fmt::Debug for AnchorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorConfig")
            .field("gateway_url", &self.gateway_url)
            .field("topic_id", &self.topic_id)
            .field("network", &self.network)
            .field("operator_id", &self.operator_id)
            .field("operator_key", &"[REDACTED]")
            .field("policy", &self.policy)
            .finish()
    }
}

impl AnchorConfig {
    /// Load the anchoring configuration from environment variables.
    ///
    /// Variables:
    /// - `LEDGER_GATEWAY_URL` (required)
    /// - `LEDGER_TOPIC_ID` (required)
    /// - `LEDGER_OPERATOR_ID` (required)
    /// - `LEDGER_OPERATOR_KEY` (required)
    /// - `LEDGER_NETWORK` (`mainnet` | `testnet`, default: `mainnet`)
    /// - plus the `ANCHOR_*` policy variables (see
    ///   [`AnchorPolicy::from_env`])
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent, the
    /// gateway URL fails to parse, or the network name is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gateway_raw = require_var("LEDGER_GATEWAY_URL")?;
        let gateway_url = Url::parse(&gateway_raw).map_err(|e| ConfigError::InvalidUrl {
            var: "LEDGER_GATEWAY_URL",
            reason: e.to_string(),
        })?;
        let network = match std::env::var("LEDGER_NETWORK") {
            Ok(raw) => raw.parse()?,
            Err(_) => LedgerNetwork::default(),
        };

        Ok(Self {
            gateway_url,
            topic_id: require_var("LEDGER_TOPIC_ID")?,
            network,
            operator_id: require_var("LEDGER_OPERATOR_ID")?,
            operator_key: require_var("LEDGER_OPERATOR_KEY")?,
            policy: AnchorPolicy::from_env(),
        })
    }
}

fn require_var(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    /// An environment variable held an unparseable URL.
    #[error("invalid URL in {var}: {reason}")]
    InvalidUrl {
        /// The variable that held the bad value.
        var: &'static str,
        /// Parser diagnostic.
        reason: String,
    },

    /// The network name is not recognised.
    #[error("unknown ledger network {0:?} (expected \"mainnet\" or \"testnet\")")]
    InvalidNetwork(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
