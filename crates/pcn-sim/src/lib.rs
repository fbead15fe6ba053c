//! PCN Sim — experiment driver for the payment channel network engine.
//!
//! [`topology`] builds seeded random networks; [`runner`] replays random
//! payments through validation, propagation, and settlement and aggregates
//! the per-call reports into [`TrialStats`].

pub mod error;
pub mod runner;
pub mod topology;

pub use error::SimError;
pub use runner::{RatioSummary, Simulation, TrialStats};
pub use topology::{create_network, mark_dishonest};
