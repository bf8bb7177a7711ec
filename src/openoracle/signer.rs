//! secp256k1 key used to sign open oracle bundles.
//!
//! # Security
//! - The key comes from configuration or `RELAY_ETHEREUM_PRIVATE_KEY`
//! - Keys are never logged or serialized

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::error::{RelayError, RelayResult};

/// Environment variable name for the oracle private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "RELAY_ETHEREUM_PRIVATE_KEY";

/// Signs open oracle messages with an Ethereum-style key.
#[derive(Debug, Clone)]
pub struct OracleSigner {
    signer: PrivateKeySigner,
}

impl OracleSigner {
    /// Create a signer from a hex-encoded private key.
    ///
    /// # Arguments
    /// * `private_key_hex` - 32-byte secp256k1 key, with or without 0x prefix
    ///
    /// # Returns
    /// A signer or error if the key is invalid
    pub fn from_private_key(private_key_hex: &str) -> RelayResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| RelayError::Crypto(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Oracle signer initialized");

        Ok(Self { signer })
    }

    /// Address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign message bytes with the Ethereum personal-message prefix.
    pub async fn sign_message(&self, message: &[u8]) -> RelayResult<alloy::signers::Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| RelayError::Crypto(format!("Message signing failed: {}", e)))
    }
}
