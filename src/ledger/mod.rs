//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! client.rs (fetch tip)
//!     → assembler.rs (marshal input data, wallet signature)
//!     → pow.rs (anti-spam nonce on the same tip's block hash)
//!     → client.rs (synchronous submit, verdict)
//! ```
//!
//! # Security Constraints
//! - Height, chain id and block hash always come from one tip snapshot
//! - Each transaction gets a fresh random transaction id
//! - All node calls have configurable timeouts

pub mod assembler;
pub mod client;
pub mod pow;
pub mod types;

pub use assembler::TxAssembler;
pub use client::{ChainStateReader, NodeClient, TransactionSubmitter};
pub use pow::PowSolver;
pub use types::{ChainTip, Command, SubmissionResult, TransactionEnvelope};
