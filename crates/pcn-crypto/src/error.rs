/// Errors raised by the hashing and comparison primitives.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The comparison range does not cover the balance being compared.
    ///
    /// Never carries the balance.
    #[error("oracle range [0, {upper_bound}) does not contain the compared balance")]
    InvalidOracleRange { upper_bound: i64 },

    #[error("invalid oracle salt: {0}")]
    InvalidSalt(String),

    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),
}
