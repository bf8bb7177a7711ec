//! HTTP JSON price feeds.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::config::FeedConfig;
use crate::error::{RelayError, RelayResult};
use crate::feed::{BundleFeed, PriceFeed};
use crate::openoracle::{PriceObservation, SignedOracleBundle};

#[derive(Debug, Clone)]
struct FeedClient {
    client: reqwest::Client,
    url: String,
    timeout_duration: Duration,
}

impl FeedClient {
    fn new(config: &FeedConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            timeout_duration: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self) -> RelayResult<T> {
        let fut = async {
            let res = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| RelayError::Network(format!("Feed request failed: {}", e)))?;

            let status = res.status();
            if !status.is_success() {
                return Err(RelayError::Network(format!("Feed returned status {}", status)));
            }

            res.json::<T>()
                .await
                .map_err(|e| RelayError::Encoding(format!("Invalid feed response: {}", e)))
        };

        match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.timeout_duration)),
        }
    }
}

/// Pulls a JSON array of `{asset, timestamp, price}` from a URL.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    inner: FeedClient,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            inner: FeedClient::new(config),
        }
    }
}

#[async_trait]
impl PriceFeed for HttpFeed {
    async fn pull(&self) -> RelayResult<Vec<PriceObservation>> {
        let observations: Vec<PriceObservation> = self.inner.get_json().await?;
        tracing::debug!(url = %self.inner.url, count = observations.len(), "Feed pulled");
        Ok(observations)
    }
}

/// Pulls an open oracle document signed by a third party.
#[derive(Debug, Clone)]
pub struct SignedHttpFeed {
    inner: FeedClient,
}

impl SignedHttpFeed {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            inner: FeedClient::new(config),
        }
    }
}

#[async_trait]
impl BundleFeed for SignedHttpFeed {
    async fn pull_bundle(&self) -> RelayResult<SignedOracleBundle> {
        let bundle: SignedOracleBundle = self.inner.get_json().await?;
        tracing::debug!(
            url = %self.inner.url,
            signer = %bundle.signer,
            count = bundle.prices.len(),
            "Signed bundle pulled"
        );
        Ok(bundle)
    }
}
