//! PCN Settlement Layer
//!
//! Runs one payment attempt along a validated path as a two-phase HTLC:
//! forward locks from sender to receiver, then preimage revelation back from
//! receiver to sender. A refused reveal rolls every lock and credit back.

pub mod error;
pub mod htlc;
pub mod types;

pub use error::SettlementError;
pub use htlc::{HtlcEngine, HtlcEngineConfig, PaymentAttempt};
pub use types::{AttemptId, SettlementOutcome, SettlementReceipt};
