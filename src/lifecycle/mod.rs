//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast to long-running loops
//!             → Cancel token aborts in-flight node calls and PoW search
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Cancel, Shutdown};
