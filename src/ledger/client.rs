//! Ledger node client with timeout and error handling.
//!
//! # Responsibilities
//! - Read the chain tip (height, hash, chain id, spam PoW parameters)
//! - Submit transactions synchronously and report the node's verdict
//! - Keep transport failures distinct from validation rejections

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use url::Url;

use crate::config::NodeConfig;
use crate::error::{RelayError, RelayResult};
use crate::ledger::types::{
    ChainTip, LastBlockHeightResponse, SubmissionResult, SubmitTransactionRequest, SubmitType,
    TransactionEnvelope,
};
use crate::observability::metrics;

/// Reads the node's current view of the chain.
#[async_trait]
pub trait ChainStateReader: Send + Sync {
    /// Fetch the latest tip. Every call goes to the node.
    async fn fetch_tip(&self) -> RelayResult<ChainTip>;
}

/// Sends assembled transactions to the node.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit synchronously. A node-side rejection is
    /// [`RelayError::ValidationRejection`]; transport failures are
    /// [`RelayError::Network`] or [`RelayError::Timeout`].
    async fn submit(&self, envelope: &TransactionEnvelope) -> RelayResult<SubmissionResult>;
}

/// REST client for a single ledger node.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_duration: Duration,
}

impl NodeClient {
    /// Create a client for the configured node.
    ///
    /// # Arguments
    /// * `config` - Node address and per-request timeout
    ///
    /// # Returns
    /// A client, or a configuration error if the address is not a URL.
    /// No request is made.
    pub fn new(config: NodeConfig) -> RelayResult<Self> {
        let mut address = config.address.trim().to_string();
        if !address.ends_with('/') {
            address.push('/');
        }
        let base_url: Url = address.parse().map_err(|e| {
            RelayError::Configuration(format!("Invalid node address '{}': {}", config.address, e))
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            node = %base_url,
            timeout_secs = config.timeout_secs,
            "Node client initialized"
        );

        Ok(Self {
            http,
            base_url,
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    fn endpoint(&self, path: &str) -> RelayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RelayError::Configuration(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> RelayResult<T> {
        let start = Instant::now();
        let fut = async {
            let response = request
                .send()
                .await
                .map_err(|e| RelayError::Network(format!("Request to {} failed: {}", endpoint, e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| RelayError::Network(format!("Reading {} response failed: {}", endpoint, e)))?;

            if !status.is_success() {
                return Err(RelayError::Network(format!(
                    "Node returned status {} for {}: {}",
                    status, endpoint, body
                )));
            }

            serde_json::from_str::<T>(&body).map_err(|e| {
                RelayError::Encoding(format!("Invalid {} response: {}", endpoint, e))
            })
        };

        let result = match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.timeout_duration)),
        };

        metrics::record_node_request(endpoint, result.is_ok(), start);
        if let Err(e) = &result {
            tracing::warn!(endpoint = endpoint, error = %e, "Node request failed");
        }
        result
    }
}

#[async_trait]
impl ChainStateReader for NodeClient {
    async fn fetch_tip(&self) -> RelayResult<ChainTip> {
        let url = self.endpoint("blockchain/height")?;
        let res: LastBlockHeightResponse = self
            .send_json("blockchain/height", self.http.get(url))
            .await?;
        let tip = ChainTip::from(res);

        tracing::debug!(
            height = tip.height,
            chain_id = %tip.chain_id,
            difficulty = tip.pow_difficulty,
            "Chain tip fetched"
        );
        Ok(tip)
    }
}

#[async_trait]
impl TransactionSubmitter for NodeClient {
    async fn submit(&self, envelope: &TransactionEnvelope) -> RelayResult<SubmissionResult> {
        let url = self.endpoint("transaction")?;
        let body = SubmitTransactionRequest {
            tx: envelope.clone(),
            submit_type: SubmitType::Sync,
        };

        let res: SubmissionResult = self
            .send_json("transaction", self.http.post(url).json(&body))
            .await?;

        if !res.success {
            return Err(RelayError::ValidationRejection {
                tx_hash: res.tx_hash,
                code: res.code,
                data: res.data,
            });
        }

        Ok(res)
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
