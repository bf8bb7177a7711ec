//! Hierarchical deterministic ed25519 wallet.
//!
//! Keys follow SLIP-10 hardened derivation along `m/1789'/0'/index'`.
//! The BIP-32 seed is supplied as hex; turning a mnemonic into that seed
//! happens outside the relay.
//!
//! # Security
//! - Secret keys stay inside the wallet and are never logged
//! - Signing requests are serialized per wallet

use std::collections::HashMap;

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tokio::sync::Mutex;

use crate::error::{RelayError, RelayResult};
use crate::wallet::types::{TxSignature, Wallet, WalletIdentity, SIGNATURE_ALGO, SIGNATURE_VERSION};

type HmacSha512 = Hmac<Sha512>;

/// Environment variable name for the wallet seed.
pub const SEED_ENV_VAR: &str = "RELAY_WALLET_SEED";

const ED25519_CURVE: &[u8] = b"ed25519 seed";
const HARDENED_OFFSET: u32 = 0x8000_0000;
const PURPOSE: u32 = 1789;
const COIN: u32 = 0;

#[derive(Clone)]
struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    fn from_hmac(key: &[u8], data: &[u8]) -> RelayResult<Self> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| RelayError::Wallet(format!("HMAC init failed: {}", e)))?;
        mac.update(data);
        let out = mac.finalize().into_bytes();

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&out[..32]);
        chain_code.copy_from_slice(&out[32..]);
        Ok(Self { key, chain_code })
    }

    fn master(seed: &[u8]) -> RelayResult<Self> {
        Self::from_hmac(ED25519_CURVE, seed)
    }

    /// ed25519 under SLIP-10 only supports hardened children.
    fn child(&self, index: u32) -> RelayResult<Self> {
        let mut data = Vec::with_capacity(37);
        data.push(0u8);
        data.extend_from_slice(&self.key);
        data.extend_from_slice(&(index | HARDENED_OFFSET).to_be_bytes());
        Self::from_hmac(&self.chain_code, &data)
    }
}

/// ed25519 wallet deriving keys from a BIP-32 seed.
pub struct HdWallet {
    master: ExtendedKey,
    keys: HashMap<String, SigningKey>,
    sign_lock: Mutex<()>,
}

impl HdWallet {
    /// Create a wallet from raw seed bytes.
    ///
    /// # Arguments
    /// * `seed` - BIP-32 seed, 16 to 64 bytes
    ///
    /// # Returns
    /// A wallet rooted at `m/1789'/0'` with no keys derived yet.
    pub fn from_seed(seed: &[u8]) -> RelayResult<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(RelayError::Wallet(format!(
                "Seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }

        let root = ExtendedKey::master(seed)?;
        let master = root.child(PURPOSE)?.child(COIN)?;

        Ok(Self {
            master,
            keys: HashMap::new(),
            sign_lock: Mutex::new(()),
        })
    }

    /// Create a wallet from a hex-encoded seed (with or without 0x prefix).
    pub fn from_seed_hex(seed_hex: &str) -> RelayResult<Self> {
        let trimmed = seed_hex.trim();
        let seed = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| RelayError::Wallet(format!("Invalid seed hex: {}", e)))?;
        Self::from_seed(&seed)
    }

    /// Derive the key at `index` and register it for signing.
    pub fn derive_identity(&mut self, index: u32) -> RelayResult<WalletIdentity> {
        let child = self.master.child(index)?;
        let signing_key = SigningKey::from_bytes(&child.key);
        let public_key = hex::encode(signing_key.verifying_key().to_bytes());

        tracing::info!(public_key = %public_key, index = index, "Wallet key derived");

        self.keys.insert(public_key.clone(), signing_key);
        Ok(WalletIdentity { public_key, index })
    }
}

#[async_trait]
impl Wallet for HdWallet {
    async fn sign(&self, identity: &WalletIdentity, data: &[u8]) -> RelayResult<TxSignature> {
        let key = self.keys.get(&identity.public_key).ok_or_else(|| {
            RelayError::Wallet(format!("Unknown public key {}", identity.public_key))
        })?;

        let _guard = self.sign_lock.lock().await;
        let signature = key.sign(data);

        Ok(TxSignature {
            value: hex::encode(signature.to_bytes()),
            algo: SIGNATURE_ALGO.to_string(),
            version: SIGNATURE_VERSION,
        })
    }
}

impl std::fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdWallet")
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
