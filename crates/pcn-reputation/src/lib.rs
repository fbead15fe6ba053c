//! PCN Reputation Layer
//!
//! Nodes keep private per-peer scores (see [`pcn_core::ReputationTable`]).
//! This crate spreads those scores one hop at a time: a node copies the
//! opinions of the neighbors it trusts for peers it has no opinion on yet.

pub mod error;
pub mod propagation;

pub use error::ReputationError;
pub use propagation::{PropagationConfig, ReputationPropagator};
