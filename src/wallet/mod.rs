//! Wallet integration.
//!
//! The relay only ever sees a [`WalletIdentity`] and a [`Wallet`] that signs
//! on its behalf. `hd.rs` provides the seed-backed implementation used by the
//! binary; tests and embedders may plug in their own.

pub mod hd;
pub mod types;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::{RelayError, RelayResult};

pub use hd::HdWallet;
pub use types::{TxSignature, Wallet, WalletIdentity, SIGNATURE_ALGO, SIGNATURE_VERSION};

/// Check an ed25519 transaction signature the way the node does.
pub fn verify_signature(public_key_hex: &str, data: &[u8], signature: &TxSignature) -> RelayResult<()> {
    if signature.algo != SIGNATURE_ALGO {
        return Err(RelayError::Crypto(format!(
            "Unsupported signature algorithm '{}'",
            signature.algo
        )));
    }

    let key_bytes: [u8; 32] = hex::decode(public_key_hex)
        .map_err(|e| RelayError::Crypto(format!("Invalid public key hex: {}", e)))?
        .try_into()
        .map_err(|_| RelayError::Crypto("Invalid public key length".to_string()))?;
    let public_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| RelayError::Crypto(format!("Invalid public key bytes: {}", e)))?;

    let sig_bytes: [u8; 64] = hex::decode(&signature.value)
        .map_err(|e| RelayError::Crypto(format!("Invalid signature hex: {}", e)))?
        .try_into()
        .map_err(|_| RelayError::Crypto("Invalid signature length".to_string()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    public_key
        .verify(data, &sig)
        .map_err(|e| RelayError::Crypto(format!("Signature verification failed: {}", e)))
}
