//! Price feed sources.
//!
//! A [`PriceFeed`] hands over [`PriceObservation`] values for the relay to
//! sign. A [`BundleFeed`] hands over documents a third party already signed.
//! The relay does not judge staleness or bounds of either.

pub mod http;

use async_trait::async_trait;

use crate::error::{RelayError, RelayResult};
use crate::openoracle::{PriceObservation, SignedOracleBundle};

pub use http::{HttpFeed, SignedHttpFeed};

/// Source of price observations.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Pull the current observations.
    async fn pull(&self) -> RelayResult<Vec<PriceObservation>>;
}

/// Source of signed open oracle documents.
#[async_trait]
pub trait BundleFeed: Send + Sync {
    /// Pull the current signed bundle.
    async fn pull_bundle(&self) -> RelayResult<SignedOracleBundle>;
}

/// Fixed observations, e.g. supplied on the command line.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    observations: Vec<PriceObservation>,
}

impl StaticFeed {
    pub fn new(observations: Vec<PriceObservation>) -> Self {
        Self { observations }
    }
}

#[async_trait]
impl PriceFeed for StaticFeed {
    async fn pull(&self) -> RelayResult<Vec<PriceObservation>> {
        if self.observations.is_empty() {
            return Err(RelayError::InvalidInput("No observations supplied".to_string()));
        }
        Ok(self.observations.clone())
    }
}

/// Bundle timestamp for a batch: the latest observation time.
pub fn bundle_timestamp(observations: &[PriceObservation]) -> Option<u64> {
    observations.iter().map(|o| o.timestamp).max()
}
