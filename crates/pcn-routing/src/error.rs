use pcn_core::Amount;
use pcn_crypto::CryptoError;

/// Errors that can occur within the routing layer.
///
/// Only contract violations end up here. Running out of paths or hitting
/// distrusted or under-funded hops is an ordinary outcome reported through
/// [`crate::ValidationReport`].
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(Amount),

    #[error("balance comparison failed: {0}")]
    Oracle(#[from] CryptoError),
}
