//! Open oracle payload types.

use alloy::primitives::{Address, Bytes};
use alloy::sol;
use serde::{Deserialize, Serialize};

/// Tag carried in every encoded message, as in the open oracle format.
pub const MESSAGE_KIND: &str = "prices";

sol! {
    /// One asset price as it appears inside the signed message.
    struct PriceEntry {
        string asset;
        uint64 timestamp;
        string price;
    }

    /// The canonical message that gets signed.
    struct PriceMessage {
        string kind;
        uint64 timestamp;
        PriceEntry[] prices;
    }
}

/// One asset's price at a moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Asset identifier (e.g. "BTC").
    pub asset: String,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Decimal price, kept as a string to avoid precision loss.
    pub price: String,
}

impl PriceObservation {
    pub fn new(asset: impl Into<String>, timestamp: u64, price: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            timestamp,
            price: price.into(),
        }
    }
}

impl From<&PriceObservation> for PriceEntry {
    fn from(obs: &PriceObservation) -> Self {
        PriceEntry {
            asset: obs.asset.clone(),
            timestamp: obs.timestamp,
            price: obs.price.clone(),
        }
    }
}

impl From<PriceEntry> for PriceObservation {
    fn from(entry: PriceEntry) -> Self {
        PriceObservation {
            asset: entry.asset,
            timestamp: entry.timestamp,
            price: entry.price,
        }
    }
}

/// A batch of observations pending signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub timestamp: u64,
    pub prices: Vec<PriceObservation>,
}

/// The signed open oracle document sent inside the ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOracleBundle {
    /// Bundle timestamp.
    pub timestamp: u64,
    /// Observations in signing order.
    pub prices: Vec<PriceObservation>,
    /// ABI-encoded [`PriceMessage`].
    pub message: Bytes,
    /// 65-byte recoverable signature (r, s, v).
    pub signature: Bytes,
    /// Address of the signing key.
    pub signer: Address,
}

impl SignedOracleBundle {
    /// Serialize to the JSON wire document.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a JSON wire document.
    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let bundle = SignedOracleBundle {
            timestamp: 1_700_000_000,
            prices: vec![PriceObservation::new("BTC", 1_700_000_000, "42000.50")],
            message: Bytes::from_static(&[0xde, 0xad]),
            signature: Bytes::from_static(&[0xbe, 0xef]),
            signer: Address::ZERO,
        };

        let value: serde_json::Value =
            serde_json::from_slice(&bundle.to_json_bytes().unwrap()).unwrap();
        assert_eq!(value["timestamp"], 1_700_000_000u64);
        assert_eq!(value["prices"][0]["asset"], "BTC");
        assert_eq!(value["prices"][0]["price"], "42000.50");
        assert_eq!(value["message"], "0xdead");
        assert_eq!(value["signature"], "0xbeef");
        assert!(value["signer"].is_string());
    }
}
