//! Open oracle bundling.
//!
//! # Data Flow
//! ```text
//! PriceObservation list + timestamp
//!     → types.rs (OracleRequest, ABI message layout)
//!     → bundle.rs (encode, sign, verify)
//!     → signer.rs (secp256k1 key, EIP-191 signing)
//!     → SignedOracleBundle (JSON wire document)
//! ```
//!
//! # Security Constraints
//! - The signing key never leaves `OracleSigner`
//! - `verify` is a self-check, not a trust boundary

pub mod bundle;
pub mod signer;
pub mod types;

pub use bundle::verify;
pub use signer::OracleSigner;
pub use types::{OracleRequest, PriceObservation, SignedOracleBundle};
