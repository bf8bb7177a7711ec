//! Error kinds shared by every stage of the relay.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while bundling, assembling or submitting prices.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or invalid credentials and settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad key, or a signature that is malformed or unrecoverable.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Node unreachable or the transport failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Node request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The node received the transaction and refused its content.
    #[error("Transaction {tx_hash} rejected by node (code {code}): {data}")]
    ValidationRejection {
        tx_hash: String,
        code: u32,
        data: String,
    },

    /// No nonce satisfied the difficulty within the search window.
    #[error("No proof-of-work nonce meets difficulty {difficulty} within {iterations} iterations")]
    ProofOfWorkExhaustion { difficulty: u32, iterations: u64 },

    /// The proof-of-work inputs were unusable.
    #[error("Proof-of-work error: {0}")]
    ProofOfWork(String),

    /// The wallet could not produce a signature.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Serialization or deserialization failed.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Caller supplied input that cannot be bundled.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The encompassing submission was abandoned.
    #[error("Operation cancelled")]
    Cancelled,
}

impl RelayError {
    /// True for errors raised before the node saw the transaction content.
    pub fn is_transport(&self) -> bool {
        matches!(self, RelayError::Network(_) | RelayError::Timeout(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Configuration(_) => "configuration",
            RelayError::Crypto(_) => "crypto",
            RelayError::Network(_) => "network",
            RelayError::Timeout(_) => "timeout",
            RelayError::ValidationRejection { .. } => "rejected",
            RelayError::ProofOfWorkExhaustion { .. } => "pow_exhausted",
            RelayError::ProofOfWork(_) => "pow",
            RelayError::Wallet(_) => "wallet",
            RelayError::Encoding(_) => "encoding",
            RelayError::InvalidInput(_) => "invalid_input",
            RelayError::Cancelled => "cancelled",
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Bundling,
    TipFetch,
    Signing,
    ProofOfWork,
    Submission,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bundling => "bundling",
            Stage::TipFetch => "tip_fetch",
            Stage::Signing => "signing",
            Stage::ProofOfWork => "proof_of_work",
            Stage::Submission => "submission",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed submission, attributed to the stage that failed.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct SubmissionError {
    pub stage: Stage,
    #[source]
    pub source: RelayError,
}

impl SubmissionError {
    pub fn new(stage: Stage, source: RelayError) -> Self {
        Self { stage, source }
    }
}

/// Attach a [`Stage`] to a [`RelayResult`].
pub trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, SubmissionError>;
}

impl<T> StageExt<T> for RelayResult<T> {
    fn at(self, stage: Stage) -> Result<T, SubmissionError> {
        self.map_err(|source| SubmissionError::new(stage, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Request timed out after 10s");

        let err = RelayError::ProofOfWorkExhaustion {
            difficulty: 10,
            iterations: 10_000,
        };
        assert!(err.to_string().contains("difficulty 10"));
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn test_rejection_is_not_transport() {
        let rejected = RelayError::ValidationRejection {
            tx_hash: "ABCD".to_string(),
            code: 89,
            data: "stale chain id".to_string(),
        };
        assert!(!rejected.is_transport());
        assert!(RelayError::Network("connection refused".into()).is_transport());
        assert!(RelayError::Timeout(Duration::from_secs(1)).is_transport());
    }

    #[test]
    fn test_stage_attribution() {
        let result: RelayResult<()> = Err(RelayError::Cancelled);
        let err = result.at(Stage::ProofOfWork).unwrap_err();
        assert_eq!(err.stage, Stage::ProofOfWork);
        assert_eq!(err.to_string(), "proof_of_work failed: Operation cancelled");
    }
}
