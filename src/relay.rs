//! The price relay pipeline.
//!
//! ```text
//! observations → bundle + self-check → command → fetch tip
//!     → assemble (sign, PoW) → submit → SubmissionResult
//! ```
//!
//! One call to [`PriceRelay::send`] is one submission. It either succeeds
//! or fails with a single [`SubmissionError`] naming the failed stage.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult, Stage, StageExt, SubmissionError};
use crate::ledger::types::{OracleDataSubmission, OracleSource};
use crate::ledger::{
    ChainStateReader, ChainTip, Command, NodeClient, PowSolver, SubmissionResult,
    TransactionSubmitter, TxAssembler,
};
use crate::lifecycle::Cancel;
use crate::observability::metrics;
use crate::openoracle::{self, OracleRequest, OracleSigner, PriceObservation, SignedOracleBundle};
use crate::wallet::{HdWallet, Wallet, WalletIdentity};

/// Result of an accepted submission.
#[derive(Debug, Clone)]
pub struct RelayOutcome {
    pub bundle: SignedOracleBundle,
    pub tip: ChainTip,
    pub result: SubmissionResult,
}

/// Publishes signed price bundles to the ledger.
pub struct PriceRelay {
    oracle_signer: OracleSigner,
    wallet: Arc<dyn Wallet>,
    identity: WalletIdentity,
    reader: Arc<dyn ChainStateReader>,
    submitter: Arc<dyn TransactionSubmitter>,
    assembler: TxAssembler,
    strict_self_check: bool,
}

impl PriceRelay {
    pub fn new(
        oracle_signer: OracleSigner,
        wallet: Arc<dyn Wallet>,
        identity: WalletIdentity,
        reader: Arc<dyn ChainStateReader>,
        submitter: Arc<dyn TransactionSubmitter>,
        assembler: TxAssembler,
    ) -> Self {
        Self {
            oracle_signer,
            wallet,
            identity,
            reader,
            submitter,
            assembler,
            strict_self_check: false,
        }
    }

    /// Fail the submission when the post-signing self-check fails.
    pub fn with_strict_self_check(mut self, strict: bool) -> Self {
        self.strict_self_check = strict;
        self
    }

    /// Wire up the relay from a validated configuration.
    ///
    /// # Arguments
    /// * `config` - Configuration that passed `validate_config`
    ///
    /// # Returns
    /// A relay backed by an `HdWallet` and a `NodeClient`. Fails if a key
    /// or the node address cannot be parsed.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let oracle_signer = OracleSigner::from_private_key(&config.oracle.ethereum_private_key)?;

        let mut wallet = HdWallet::from_seed_hex(&config.wallet.seed)?;
        let identity = wallet.derive_identity(config.wallet.key_index)?;

        let node = Arc::new(NodeClient::new(config.node.clone())?);
        let assembler = TxAssembler::new(PowSolver::new(config.pow.max_iterations));

        Ok(Self::new(
            oracle_signer,
            Arc::new(wallet),
            identity,
            node.clone(),
            node,
            assembler,
        )
        .with_strict_self_check(config.oracle.strict_self_check))
    }

    /// Identity that authorizes transactions.
    pub fn identity(&self) -> &WalletIdentity {
        &self.identity
    }

    /// Read the current chain tip.
    pub async fn chain_tip(&self) -> RelayResult<ChainTip> {
        self.reader.fetch_tip().await
    }

    /// Sign `observations` into an open oracle bundle and self-check it.
    pub async fn bundle(
        &self,
        timestamp: u64,
        observations: Vec<PriceObservation>,
    ) -> Result<SignedOracleBundle, SubmissionError> {
        let bundle = OracleRequest::new(timestamp, observations)
            .sign(&self.oracle_signer)
            .await
            .at(Stage::Bundling)?;

        if let Err(e) = self.self_check(&bundle) {
            if self.strict_self_check {
                return Err(SubmissionError::new(Stage::Bundling, e));
            }
            tracing::warn!(error = %e, "Open oracle self-check failed");
        }

        Ok(bundle)
    }

    fn self_check(&self, bundle: &SignedOracleBundle) -> RelayResult<()> {
        let (address, prices) = openoracle::verify(bundle)?;
        tracing::debug!(
            recovered = %address,
            prices = prices.len(),
            "Recovered open oracle signer"
        );

        if address != self.oracle_signer.address() {
            return Err(RelayError::Crypto(format!(
                "Recovered signer {} does not match {}",
                address,
                self.oracle_signer.address()
            )));
        }
        if prices != bundle.prices {
            return Err(RelayError::Crypto(
                "Recovered prices differ from the bundle".to_string(),
            ));
        }
        Ok(())
    }

    /// Bundle, sign and submit `observations` as one submission.
    pub async fn send(
        &self,
        timestamp: u64,
        observations: Vec<PriceObservation>,
        cancel: &Cancel,
    ) -> Result<RelayOutcome, SubmissionError> {
        let result = async {
            let bundle = self.bundle(timestamp, observations).await?;
            self.submit_bundle(bundle, cancel).await
        }
        .await;
        record_outcome(&result);
        result
    }

    /// Relay a bundle signed by a third party without signing it again.
    ///
    /// The bundle must verify and its plain fields must match the signed
    /// message; otherwise nothing is submitted.
    pub async fn relay_bundle(
        &self,
        bundle: SignedOracleBundle,
        cancel: &Cancel,
    ) -> Result<RelayOutcome, SubmissionError> {
        let result = async {
            check_third_party(&bundle).at(Stage::Bundling)?;
            self.submit_bundle(bundle, cancel).await
        }
        .await;
        record_outcome(&result);
        result
    }

    async fn submit_bundle(
        &self,
        bundle: SignedOracleBundle,
        cancel: &Cancel,
    ) -> Result<RelayOutcome, SubmissionError> {
        let payload = bundle
            .to_json_bytes()
            .map_err(|e| RelayError::Encoding(format!("Could not marshal bundle: {}", e)))
            .at(Stage::Bundling)?;
        let command = Command::OracleDataSubmission(OracleDataSubmission {
            source: OracleSource::OpenOracle,
            payload,
        });

        let tip = cancel
            .run(self.reader.fetch_tip())
            .await
            .at(Stage::TipFetch)?;

        let envelope = self
            .assembler
            .assemble(&self.identity, command, self.wallet.as_ref(), &tip, cancel)
            .await?;

        let result = cancel
            .run(self.submitter.submit(&envelope))
            .await
            .at(Stage::Submission)?;

        Ok(RelayOutcome {
            bundle,
            tip,
            result,
        })
    }
}

fn check_third_party(bundle: &SignedOracleBundle) -> RelayResult<()> {
    if bundle.prices.is_empty() {
        return Err(RelayError::InvalidInput(
            "Signed bundle carries no observations".to_string(),
        ));
    }

    let (address, prices) = openoracle::verify(bundle)?;
    if address != bundle.signer {
        return Err(RelayError::Crypto(format!(
            "Bundle claims signer {} but was signed by {}",
            bundle.signer, address
        )));
    }
    if prices != bundle.prices {
        return Err(RelayError::Crypto(
            "Bundle prices differ from the signed message".to_string(),
        ));
    }

    tracing::debug!(signer = %address, prices = prices.len(), "Third-party bundle verified");
    Ok(())
}

fn record_outcome(result: &Result<RelayOutcome, SubmissionError>) {
    match result {
        Ok(outcome) => {
            metrics::record_submission_success();
            tracing::info!(
                tx_hash = %outcome.result.tx_hash,
                height = outcome.tip.height,
                "Prices submitted"
            );
        }
        Err(e) => {
            metrics::record_submission_failure(e.stage, e.source.kind());
            tracing::error!(stage = %e.stage, error = %e.source, "Submission failed");
        }
    }
}

impl std::fmt::Debug for PriceRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceRelay")
            .field("oracle_address", &self.oracle_signer.address())
            .field("public_key", &self.identity.public_key)
            .field("strict_self_check", &self.strict_self_check)
            .finish()
    }
}
