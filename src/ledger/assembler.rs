//! Transaction assembly: input data, wallet signature, proof-of-work.
//!
//! Every chain-dependent value (height, chain id, block hash, difficulty)
//! comes from the single [`ChainTip`] passed to [`TxAssembler::assemble`].

use std::time::Instant;

use rand::Rng;

use crate::error::{RelayError, RelayResult, Stage, StageExt, SubmissionError};
use crate::ledger::pow::{self, PowSolver};
use crate::ledger::types::{
    signing_payload, ChainTip, Command, InputData, ProofOfWork, TransactionEnvelope,
    WalletRequest, TX_VERSION,
};
use crate::lifecycle::Cancel;
use crate::observability::metrics;
use crate::wallet::{Wallet, WalletIdentity};

/// Marshal a wallet request into input data bound to `block_height`.
pub fn marshal_input_data(request: &WalletRequest, block_height: u64) -> RelayResult<Vec<u8>> {
    if request.pub_key.is_empty() {
        return Err(RelayError::InvalidInput(
            "Wallet request has no public key".to_string(),
        ));
    }

    let input = InputData {
        nonce: rand::thread_rng().gen(),
        block_height,
        command: request.command.clone(),
    };

    serde_json::to_vec(&input)
        .map_err(|e| RelayError::Encoding(format!("Could not marshal input data: {}", e)))
}

/// Builds submittable transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxAssembler {
    solver: PowSolver,
}

impl TxAssembler {
    pub fn new(solver: PowSolver) -> Self {
        Self { solver }
    }

    /// Assemble an envelope for `command` against `tip`.
    ///
    /// Any failing step aborts the whole assembly.
    pub async fn assemble(
        &self,
        identity: &WalletIdentity,
        command: Command,
        wallet: &dyn Wallet,
        tip: &ChainTip,
        cancel: &Cancel,
    ) -> Result<TransactionEnvelope, SubmissionError> {
        let request = WalletRequest {
            pub_key: identity.public_key.clone(),
            command,
        };
        let input_data = marshal_input_data(&request, tip.height).at(Stage::Signing)?;

        let payload = signing_payload(&input_data, &tip.chain_id);
        let signature = cancel
            .run(wallet.sign(identity, &payload))
            .await
            .at(Stage::Signing)?;

        let tid = pow::random_tx_id();
        let solution = self
            .solve_blocking(tip, &tid, cancel)
            .await
            .at(Stage::ProofOfWork)?;

        tracing::debug!(
            height = tip.height,
            tid = %tid,
            nonce = solution.nonce,
            score = solution.score,
            "Transaction assembled"
        );

        Ok(TransactionEnvelope {
            input_data,
            signature,
            pub_key: identity.public_key.clone(),
            version: TX_VERSION,
            pow: ProofOfWork {
                tid,
                nonce: solution.nonce,
            },
        })
    }

    /// Run the nonce search on a blocking worker.
    async fn solve_blocking(
        &self,
        tip: &ChainTip,
        tid: &str,
        cancel: &Cancel,
    ) -> RelayResult<pow::PowSolution> {
        let solver = self.solver;
        let block_hash = tip.block_hash.clone();
        let hash_function = tip.pow_hash_function.clone();
        let difficulty = tip.pow_difficulty;
        let tid = tid.to_string();
        let cancel = cancel.clone();

        let start = Instant::now();
        let solution = tokio::task::spawn_blocking(move || {
            solver.solve(&block_hash, &tid, difficulty, &hash_function, &cancel)
        })
        .await
        .map_err(|e| RelayError::ProofOfWork(format!("Solver task failed: {}", e)))??;

        metrics::record_pow(difficulty, solution.nonce + 1, start);
        Ok(solution)
    }
}
