//! Ledger wire types: chain tip, commands, transaction envelope.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, DisplayFromStr, PickFirst};

use crate::error::{RelayError, RelayResult};
use crate::ledger::pow;
use crate::wallet::{self, TxSignature};

/// Transaction format version understood by the node.
pub const TX_VERSION: u32 = 3;

/// How many blocks behind the head a transaction's bound height may be.
pub const HEIGHT_TOLERANCE: u64 = 150;

/// Latest observed ledger state. Fetched per submission, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTip {
    pub height: u64,
    /// Hex-encoded block hash, 64 characters.
    pub block_hash: String,
    pub chain_id: String,
    pub pow_difficulty: u32,
    pub pow_hash_function: String,
}

/// `GET /blockchain/height` response body.
#[serde_as]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastBlockHeightResponse {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub height: u64,
    pub hash: String,
    pub chain_id: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub spam_pow_difficulty: u32,
    pub spam_pow_hash_function: String,
}

impl From<LastBlockHeightResponse> for ChainTip {
    fn from(res: LastBlockHeightResponse) -> Self {
        ChainTip {
            height: res.height,
            block_hash: res.hash,
            chain_id: res.chain_id,
            pow_difficulty: res.spam_pow_difficulty,
            pow_hash_function: res.spam_pow_hash_function,
        }
    }
}

/// Origin of submitted oracle data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleSource {
    #[serde(rename = "ORACLE_SOURCE_OPEN_ORACLE")]
    OpenOracle,
}

/// Oracle payload command; the payload is an opaque blob.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleDataSubmission {
    pub source: OracleSource,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
}

/// Commands the relay can submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    OracleDataSubmission(OracleDataSubmission),
}

/// A command together with the key that authorizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRequest {
    pub pub_key: String,
    pub command: Command,
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    /// Random value making identical commands hash differently.
    pub nonce: u64,
    pub block_height: u64,
    #[serde(flatten)]
    pub command: Command,
}

/// Anti-spam proof attached to a transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfWork {
    /// Random transaction identifier the proof is bound to.
    pub tid: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub nonce: u64,
}

/// The fully assembled, signed and PoW-stamped transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    #[serde_as(as = "Base64")]
    pub input_data: Vec<u8>,
    pub signature: TxSignature,
    pub pub_key: String,
    pub version: u32,
    pub pow: ProofOfWork,
}

/// Bytes the wallet signs: input data followed by the chain id.
pub fn signing_payload(input_data: &[u8], chain_id: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(input_data.len() + chain_id.len());
    payload.extend_from_slice(input_data);
    payload.extend_from_slice(chain_id.as_bytes());
    payload
}

impl TransactionEnvelope {
    /// Decode the signed input data.
    pub fn decode_input_data(&self) -> RelayResult<InputData> {
        serde_json::from_slice(&self.input_data)
            .map_err(|e| RelayError::Encoding(format!("Invalid input data: {}", e)))
    }

    /// Check the envelope against the snapshot it claims to be bound to:
    /// signature over the input data and chain id, block height binding,
    /// and proof-of-work on that block's hash.
    ///
    /// Whether the bound height is still recent enough is a separate check,
    /// see [`TransactionEnvelope::check_height`].
    pub fn verify(&self, tip: &ChainTip) -> RelayResult<()> {
        wallet::verify_signature(
            &self.pub_key,
            &signing_payload(&self.input_data, &tip.chain_id),
            &self.signature,
        )?;

        let input = self.decode_input_data()?;
        if input.block_height != tip.height {
            return Err(RelayError::InvalidInput(format!(
                "Input data bound to height {}, tip is {}",
                input.block_height, tip.height
            )));
        }

        let valid = pow::verify(
            &tip.block_hash,
            &self.pow.tid,
            self.pow.nonce,
            tip.pow_difficulty,
            &tip.pow_hash_function,
        )?;
        if !valid {
            return Err(RelayError::ProofOfWork(format!(
                "Nonce {} does not meet difficulty {} for block {}",
                self.pow.nonce, tip.pow_difficulty, tip.block_hash
            )));
        }

        Ok(())
    }

    /// Accept input data bound to the head or to any of the
    /// [`HEIGHT_TOLERANCE`] blocks before it.
    pub fn check_height(&self, head_height: u64) -> RelayResult<()> {
        let bound = self.decode_input_data()?.block_height;
        if bound > head_height {
            return Err(RelayError::InvalidInput(format!(
                "Input data bound to future height {}, head is {}",
                bound, head_height
            )));
        }
        if head_height - bound > HEIGHT_TOLERANCE {
            return Err(RelayError::InvalidInput(format!(
                "Input data bound to height {} is more than {} blocks behind head {}",
                bound, HEIGHT_TOLERANCE, head_height
            )));
        }
        Ok(())
    }
}

/// Submission mode; the relay only uses synchronous check-tx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitType {
    #[serde(rename = "TYPE_SYNC")]
    Sync,
}

/// `POST /transaction` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub tx: TransactionEnvelope,
    #[serde(rename = "type")]
    pub submit_type: SubmitType,
}

/// The node's immediate verdict on a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub code: u32,
    /// Diagnostic data, set when the node rejects the transaction.
    #[serde(default)]
    pub data: String,
}
