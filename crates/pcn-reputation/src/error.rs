use pcn_core::Score;

/// Reputation-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum ReputationError {
    #[error("threshold range is empty: min {min} > max {max}")]
    EmptyThresholdRange { min: Score, max: Score },

    #[error("update probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
}
