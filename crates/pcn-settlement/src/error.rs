use pcn_core::{Amount, CoreError};

use crate::types::AttemptId;

/// Settlement-layer errors.
///
/// A refused reveal is not an error: it comes back as
/// [`crate::SettlementOutcome::RolledBack`] inside an `Ok` receipt.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("path cannot be settled: {0}")]
    MalformedPath(#[source] CoreError),

    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(Amount),

    #[error("attempt {attempt}: {source}")]
    InvalidStateTransition {
        attempt: AttemptId,
        #[source]
        source: CoreError,
    },
}
