use pcn_core::CoreError;
use pcn_reputation::ReputationError;
use pcn_routing::RoutingError;
use pcn_settlement::SettlementError;

/// Errors that abort a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("network error: {0}")]
    Core(#[from] CoreError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("reputation error: {0}")]
    Reputation(#[from] ReputationError),
}
