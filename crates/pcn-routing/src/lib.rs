//! PCN Routing — path discovery and route validation for the payment channel network.
//!
//! This crate provides:
//! - [`PathFinder`] — fewest-hop (BFS) or uniform-cost (Dijkstra) search over
//!   a filtered view of the [`pcn_core::ChannelGraph`].
//! - [`RouteValidator`] — walks candidate paths hop by hop, applying the
//!   reputation gate and the direct or oracle capacity check, and prunes
//!   failing edges until a path passes or the attempt budget runs out.

pub mod error;
pub mod pathfinder;
pub mod validator;

// Re-exports for convenience.
pub use error::RoutingError;
pub use pathfinder::{ExclusionSet, PathFinder, PathFinderConfig};
pub use validator::{
    CapacityCheck, RouteRejection, RouteValidator, ValidationReport, ValidationStop,
    ValidatorConfig,
};
