//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML file.

use serde::{Deserialize, Serialize};

use crate::ledger::pow::DEFAULT_MAX_ITERATIONS;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Ledger node connection.
    pub node: NodeConfig,

    /// Transaction signing wallet.
    pub wallet: WalletConfig,

    /// Open oracle signing key and checks.
    pub oracle: OracleConfig,

    /// Proof-of-work search bounds.
    pub pow: PowConfig,

    /// Optional HTTP price feed; `pull` and `watch` require it.
    pub feed: Option<FeedConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// REST endpoint of the node (e.g., "http://localhost:3003").
    pub address: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:3003".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Hex BIP-32 seed. Falls back to `RELAY_WALLET_SEED` when empty.
    pub seed: String,

    /// Index of the key used to sign transactions.
    pub key_index: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            key_index: 1,
        }
    }
}

/// Open oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OracleConfig {
    /// Hex secp256k1 key. Falls back to `RELAY_ETHEREUM_PRIVATE_KEY` when empty.
    pub ethereum_private_key: String,

    /// Abort the submission when the post-signing self-check fails.
    pub strict_self_check: bool,
}

/// Proof-of-work configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PowConfig {
    /// Maximum number of nonces tried before giving up.
    pub max_iterations: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// HTTP price feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// URL returning a JSON array of observations, or a signed open oracle
    /// document when `signed` is set.
    pub url: String,

    /// The feed serves bundles already signed by a third party. They are
    /// relayed as is, without signing them again.
    #[serde(default)]
    pub signed: bool,

    /// Polling interval for `watch`, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_feed_timeout_secs() -> u64 {
    10
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.node.timeout_secs, 10);
        assert_eq!(config.wallet.key_index, 1);
        assert!(!config.oracle.strict_self_check);
        assert!(config.feed.is_none());
        assert_eq!(config.pow.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_minimal_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            [node]
            address = "http://node:3003"

            [feed]
            url = "http://feed/prices"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.address, "http://node:3003");
        assert_eq!(config.node.timeout_secs, 10);
        let feed = config.feed.unwrap();
        assert_eq!(feed.interval_secs, 60);
        assert_eq!(feed.timeout_secs, 10);
        assert!(!feed.signed);
    }
}
