//! Anti-spam proof-of-work.
//!
//! The score of a nonce is the number of leading zero bits of
//! `H("Vega_SPAM_PoW" ‖ block_hash ‖ tx_id ‖ nonce_be)`. The solver scans
//! nonces upward from zero and returns the first one whose score meets the
//! difficulty, which is what the node re-derives when it checks the proof.

use std::str::FromStr;

use rand::RngCore;
use sha3::{Digest, Sha3_256};

use crate::error::{RelayError, RelayResult};
use crate::lifecycle::Cancel;

/// Hash function identifier published by the node.
pub const SHA3_24_ROUNDS: &str = "sha3_24_rounds";

/// Highest meaningful difficulty for a 256-bit digest.
pub const MAX_DIFFICULTY: u32 = 256;

/// Default search ceiling.
pub const DEFAULT_MAX_ITERATIONS: u64 = i64::MAX as u64;

const DOMAIN_PREFIX: &[u8] = b"Vega_SPAM_PoW";
const BLOCK_HASH_LEN: usize = 64;
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Supported proof-of-work hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha3_24Rounds,
}

impl FromStr for HashFunction {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SHA3_24_ROUNDS => Ok(HashFunction::Sha3_24Rounds),
            other => Err(RelayError::ProofOfWork(format!(
                "Unsupported hash function '{}'",
                other
            ))),
        }
    }
}

/// A nonce meeting the difficulty, with its score and digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowSolution {
    pub nonce: u64,
    pub score: u32,
    pub hash: [u8; 32],
}

/// Bounded linear nonce search. Holds no mutable state, so one solver can
/// serve any number of concurrent submissions.
#[derive(Debug, Clone, Copy)]
pub struct PowSolver {
    max_iterations: u64,
}

impl PowSolver {
    pub fn new(max_iterations: u64) -> Self {
        Self { max_iterations }
    }

    /// Find the smallest nonce whose score is at least `difficulty`.
    pub fn solve(
        &self,
        block_hash: &str,
        tx_id: &str,
        difficulty: u32,
        hash_function: &str,
        cancel: &Cancel,
    ) -> RelayResult<PowSolution> {
        let function = check_inputs(block_hash, tx_id, difficulty, hash_function)?;
        let base = prefix_state(function, block_hash, tx_id);

        for nonce in 0..self.max_iterations {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(RelayError::Cancelled);
            }

            let hash = finish(&base, nonce);
            let score = leading_zero_bits(&hash);
            if score >= difficulty {
                return Ok(PowSolution { nonce, score, hash });
            }
        }

        Err(RelayError::ProofOfWorkExhaustion {
            difficulty,
            iterations: self.max_iterations,
        })
    }
}

impl Default for PowSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

/// Score a single nonce.
pub fn score(block_hash: &str, tx_id: &str, nonce: u64, hash_function: &str) -> RelayResult<u32> {
    let function = check_inputs(block_hash, tx_id, 0, hash_function)?;
    let base = prefix_state(function, block_hash, tx_id);
    Ok(leading_zero_bits(&finish(&base, nonce)))
}

/// Node-side check of a submitted proof.
pub fn verify(
    block_hash: &str,
    tx_id: &str,
    nonce: u64,
    difficulty: u32,
    hash_function: &str,
) -> RelayResult<bool> {
    check_inputs(block_hash, tx_id, difficulty, hash_function)?;
    Ok(score(block_hash, tx_id, nonce, hash_function)? >= difficulty)
}

/// Fresh unpredictable transaction identifier (hex SHA3-256 of random bytes).
pub fn random_tx_id() -> String {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    hex::encode(Sha3_256::digest(seed))
}

fn check_inputs(
    block_hash: &str,
    tx_id: &str,
    difficulty: u32,
    hash_function: &str,
) -> RelayResult<HashFunction> {
    let function = hash_function.parse::<HashFunction>()?;

    if difficulty > MAX_DIFFICULTY {
        return Err(RelayError::ProofOfWork(format!(
            "Difficulty {} exceeds maximum {}",
            difficulty, MAX_DIFFICULTY
        )));
    }
    if tx_id.is_empty() {
        return Err(RelayError::ProofOfWork(
            "Transaction id cannot be empty".to_string(),
        ));
    }
    if block_hash.len() != BLOCK_HASH_LEN {
        return Err(RelayError::ProofOfWork(format!(
            "Block hash must be {} characters, got {}",
            BLOCK_HASH_LEN,
            block_hash.len()
        )));
    }

    Ok(function)
}

fn prefix_state(function: HashFunction, block_hash: &str, tx_id: &str) -> Sha3_256 {
    match function {
        HashFunction::Sha3_24Rounds => {
            let mut hasher = Sha3_256::new_with_prefix(DOMAIN_PREFIX);
            hasher.update(block_hash.as_bytes());
            hasher.update(tx_id.as_bytes());
            hasher
        }
    }
}

fn finish(base: &Sha3_256, nonce: u64) -> [u8; 32] {
    let mut hasher = base.clone();
    hasher.update(nonce.to_be_bytes());
    hasher.finalize().into()
}

fn leading_zero_bits(hash: &[u8]) -> u32 {
    let mut zeros = 0;
    for byte in hash {
        if *byte == 0 {
            zeros += 8;
        } else {
            zeros += byte.leading_zeros();
            break;
        }
    }
    zeros
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_HASH: &str = "2E289FB9CEF7234E2C08F34CCD66B330229067CE47D22F76EF8C3DF84E9C4DA0";
    const TX_ID: &str = "DFE522E234D67E6AE3F017859F898E576B3928EA57310B765398615A0D3FDE2F";

    #[test]
    fn test_leading_zero_bits() {
        assert_eq!(leading_zero_bits(&[0xff, 0x00]), 0);
        assert_eq!(leading_zero_bits(&[0x00, 0x80]), 8);
        assert_eq!(leading_zero_bits(&[0x00, 0x01]), 15);
        assert_eq!(leading_zero_bits(&[0x0f]), 4);
        assert_eq!(leading_zero_bits(&[0u8; 32]), 256);
    }

    #[test]
    fn test_solution_is_minimal() {
        let solver = PowSolver::new(1 << 20);
        let cancel = Cancel::new();

        for difficulty in 0..=8 {
            let solution = solver
                .solve(BLOCK_HASH, TX_ID, difficulty, SHA3_24_ROUNDS, &cancel)
                .unwrap();
            assert!(solution.score >= difficulty);
            assert_eq!(
                score(BLOCK_HASH, TX_ID, solution.nonce, SHA3_24_ROUNDS).unwrap(),
                solution.score
            );

            // Reference brute-force scan
            for smaller in 0..solution.nonce {
                let s = score(BLOCK_HASH, TX_ID, smaller, SHA3_24_ROUNDS).unwrap();
                assert!(s < difficulty, "nonce {} already meets {}", smaller, difficulty);
            }
        }
    }

    #[test]
    fn test_difficulty_zero_is_nonce_zero() {
        let solution = PowSolver::default()
            .solve(BLOCK_HASH, TX_ID, 0, SHA3_24_ROUNDS, &Cancel::new())
            .unwrap();
        assert_eq!(solution.nonce, 0);
    }

    #[test]
    fn test_verify_matches_solve() {
        let solution = PowSolver::new(1 << 20)
            .solve(BLOCK_HASH, TX_ID, 10, SHA3_24_ROUNDS, &Cancel::new())
            .unwrap();
        assert!(verify(BLOCK_HASH, TX_ID, solution.nonce, 10, SHA3_24_ROUNDS).unwrap());

        // Every nonce below the minimal one falls short
        if solution.nonce > 0 {
            assert!(!verify(BLOCK_HASH, TX_ID, solution.nonce - 1, 10, SHA3_24_ROUNDS).unwrap());
        }
    }

    #[test]
    fn test_exhaustion() {
        let result = PowSolver::new(4).solve(BLOCK_HASH, TX_ID, 256, SHA3_24_ROUNDS, &Cancel::new());
        assert!(matches!(
            result,
            Err(RelayError::ProofOfWorkExhaustion {
                difficulty: 256,
                iterations: 4
            })
        ));
    }

    #[test]
    fn test_bounded_difficulty_ten() {
        let result = PowSolver::new(10_000).solve(BLOCK_HASH, TX_ID, 10, SHA3_24_ROUNDS, &Cancel::new());
        match result {
            Ok(solution) => assert!(solution.score >= 10),
            Err(RelayError::ProofOfWorkExhaustion { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let solver = PowSolver::default();
        let cancel = Cancel::new();

        let err = solver.solve(BLOCK_HASH, TX_ID, 1, "sha256", &cancel).unwrap_err();
        assert!(err.to_string().contains("Unsupported hash function"));

        assert!(matches!(
            solver.solve(BLOCK_HASH, TX_ID, 257, SHA3_24_ROUNDS, &cancel),
            Err(RelayError::ProofOfWork(_))
        ));
        assert!(matches!(
            solver.solve(BLOCK_HASH, "", 1, SHA3_24_ROUNDS, &cancel),
            Err(RelayError::ProofOfWork(_))
        ));
        assert!(matches!(
            solver.solve("abcd", TX_ID, 1, SHA3_24_ROUNDS, &cancel),
            Err(RelayError::ProofOfWork(_))
        ));
    }

    #[test]
    fn test_cancelled_search() {
        let cancel = Cancel::new();
        cancel.cancel();
        let result = PowSolver::default().solve(BLOCK_HASH, TX_ID, 256, SHA3_24_ROUNDS, &cancel);
        assert!(matches!(result, Err(RelayError::Cancelled)));
    }

    #[test]
    fn test_random_tx_ids_are_fresh() {
        let a = random_tx_id();
        let b = random_tx_id();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
