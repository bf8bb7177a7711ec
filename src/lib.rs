//! Open oracle price relay.
//!
//! Signs price observations into an open oracle bundle, wraps the bundle in a
//! ledger transaction signed by a wallet key, stamps it with the node's
//! anti-spam proof-of-work and submits it.

pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod openoracle;
pub mod relay;
pub mod wallet;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult, Stage, SubmissionError};
pub use lifecycle::{Cancel, Shutdown};
pub use relay::{PriceRelay, RelayOutcome};
