//! PCN Core — shared model for the payment channel network engine.
//!
//! - [`ChannelGraph`]: participants, directed channels, and per-node reputation.
//! - [`Path`] and [`NodeId`]: route shape and participant identity.
//! - [`HtlcStateMachine`]: the lock/reveal lifecycle of one payment attempt.
//! - [`PcnConfig`]: TOML-backed simulation configuration.

pub mod config;
pub mod error;
pub mod graph;
pub mod reputation;
pub mod state_machine;
pub mod types;

pub use config::{
    CapacityCheckMode, ExperimentConfig, LoggingConfig, NetworkConfig, PathStrategy, PcnConfig,
    ReputationConfig, RoutingConfig, SettlementConfig,
};
pub use error::CoreError;
pub use graph::{Channel, ChannelGraph, Node};
pub use reputation::ReputationTable;
pub use state_machine::{HtlcEvent, HtlcState, HtlcStateMachine};
pub use types::{Amount, Edge, NodeId, Path, Score};
