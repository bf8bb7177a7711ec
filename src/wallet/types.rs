//! Wallet capability types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelayResult;

/// Signature algorithm identifier expected by the node.
pub const SIGNATURE_ALGO: &str = "vega/ed25519";

/// Signature scheme version.
pub const SIGNATURE_VERSION: u32 = 1;

/// Public half of a wallet key. Holds no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Hex-encoded ed25519 public key.
    pub public_key: String,
    /// Derivation index of the key.
    pub index: u32,
}

/// Signature triple carried in the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    /// Hex-encoded signature bytes.
    pub value: String,
    pub algo: String,
    pub version: u32,
}

/// Signing capability held by an external wallet.
///
/// Implementations that are not reentrant must serialize concurrent calls.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Sign `data` with the key behind `identity`.
    async fn sign(&self, identity: &WalletIdentity, data: &[u8]) -> RelayResult<TxSignature>;
}
