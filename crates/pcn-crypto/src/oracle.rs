//! Balance comparison oracle.
//!
//! Lets an intermediary attest "my balance on this channel is at least
//! `threshold`" without the answer, any error, or any log line carrying the
//! balance itself.
//!
//! [`SimulatedOracle`] is a faithful *simulation* of a millionaires'-style
//! two-party comparison. It preserves the boolean outcome exactly but offers
//! no cryptographic secrecy: both "parties" run in the same process. A real
//! secure-comparison backend can be dropped in behind [`BalanceComparison`].

use pcn_core::Amount;
use rand::Rng;

use crate::error::CryptoError;

/// Per-check randomness shared by the two simulated parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleSalt {
    base: i64,
    blinding: i64,
}

impl OracleSalt {
    /// `blinding` must be at least 1.
    pub fn new(base: i64, blinding: i64) -> Result<Self, CryptoError> {
        if blinding < 1 {
            return Err(CryptoError::InvalidSalt(format!(
                "blinding factor must be >= 1, got {}",
                blinding
            )));
        }
        Ok(Self { base, blinding })
    }

    /// Draw a fresh salt. Ranges follow the classic textbook walk-through
    /// (a small random base and a blinding factor up to 500).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            base: rng.gen_range(1..=1_000),
            blinding: rng.gen_range(1..=500),
        }
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn blinding(&self) -> i64 {
        self.blinding
    }
}

/// A two-party "is `actual >= threshold`" check.
pub trait BalanceComparison {
    /// Returns exactly `actual >= threshold`.
    ///
    /// Precondition: `0 <= actual < upper_bound`; otherwise
    /// [`CryptoError::InvalidOracleRange`].
    fn sufficient(
        &self,
        threshold: Amount,
        actual: Amount,
        upper_bound: Amount,
        salt: &OracleSalt,
    ) -> Result<bool, CryptoError>;
}

/// Shared deterministic transform `T(x) = multiplier * x + offset`.
const TRANSFORM_MULTIPLIER: i128 = 7;
const TRANSFORM_OFFSET: i128 = 42;

/// Integer rendition of the millionaires' protocol.
///
/// The balance holder blinds its balance with the salt and produces one
/// hidden value per candidate slot in `[0, upper_bound)`:
///
/// ```text
/// h_i = base + blinding * (i - actual)
/// e_i = T(h_i) + [i >= threshold]
/// ```
///
/// The verifier only ever compares against `T(base) + 1`. Since
/// `e_i - (T(base) + 1) = 7 * blinding * (i - actual) + mark_i - 1` and the
/// first term is a multiple of 7, a match exists iff `i == actual` and that
/// slot was marked, i.e. iff `actual >= threshold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedOracle;

impl SimulatedOracle {
    pub fn new() -> Self {
        Self
    }

    fn transform(x: i128) -> i128 {
        TRANSFORM_MULTIPLIER * x + TRANSFORM_OFFSET
    }

    /// Balance holder's side: the encoded value of every slot, in slot order.
    fn encode_slots(
        threshold: Amount,
        actual: Amount,
        upper_bound: Amount,
        salt: &OracleSalt,
    ) -> impl Iterator<Item = i128> {
        let base = salt.base as i128;
        let blinding = salt.blinding as i128;
        let actual = actual as i128;
        let threshold = threshold as i128;

        (0..upper_bound as i128).map(move |i| {
            let hidden = base + blinding * (i - actual);
            let mark = if i >= threshold { 1 } else { 0 };
            Self::transform(hidden) + mark
        })
    }
}

impl BalanceComparison for SimulatedOracle {
    fn sufficient(
        &self,
        threshold: Amount,
        actual: Amount,
        upper_bound: Amount,
        salt: &OracleSalt,
    ) -> Result<bool, CryptoError> {
        if actual < 0 || upper_bound <= actual {
            return Err(CryptoError::InvalidOracleRange { upper_bound });
        }

        let checker = Self::transform(salt.base as i128) + 1;
        let result =
            Self::encode_slots(threshold, actual, upper_bound, salt).any(|value| value == checker);

        tracing::trace!(threshold, upper_bound, result, "oracle comparison");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_matches_plain_comparison_for_every_slot() {
        let oracle = SimulatedOracle::new();
        let upper = 40;
        let salts = [
            OracleSalt::new(40, 1).unwrap(),
            OracleSalt::new(-13, 17).unwrap(),
            OracleSalt::new(0, 499).unwrap(),
        ];
        for salt in &salts {
            for actual in 0..upper {
                for threshold in 0..=upper + 2 {
                    let got = oracle.sufficient(threshold, actual, upper, salt).unwrap();
                    assert_eq!(
                        got,
                        actual >= threshold,
                        "threshold={} actual={} salt={:?}",
                        threshold,
                        actual,
                        salt
                    );
                }
            }
        }
    }

    #[test]
    fn test_matches_plain_comparison_random_salts() {
        let oracle = SimulatedOracle::new();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let actual = rng.gen_range(0..1_000);
            let upper = actual + rng.gen_range(1..1_000);
            let threshold = rng.gen_range(0..upper + 10);
            let salt = OracleSalt::random(&mut rng);
            assert_eq!(
                oracle.sufficient(threshold, actual, upper, &salt).unwrap(),
                actual >= threshold
            );
        }
    }

    #[test]
    fn test_zero_threshold_always_sufficient() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(5, 3).unwrap();
        assert!(oracle.sufficient(0, 0, 1, &salt).unwrap());
    }

    #[test]
    fn test_exact_balance_is_sufficient() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(40, 250).unwrap();
        assert!(oracle.sufficient(50, 50, 1_050, &salt).unwrap());
        assert!(!oracle.sufficient(51, 50, 1_050, &salt).unwrap());
    }

    #[test]
    fn test_upper_bound_must_exceed_balance() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(1, 1).unwrap();
        let result = oracle.sufficient(10, 100, 100, &salt);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidOracleRange { upper_bound: 100 })
        ));
    }

    #[test]
    fn test_negative_balance_is_out_of_range() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(1, 1).unwrap();
        assert!(oracle.sufficient(1, -5, 100, &salt).is_err());
    }

    #[test]
    fn test_error_does_not_leak_balance() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(1, 1).unwrap();
        let err = oracle.sufficient(10, 731, 700, &salt).unwrap_err();
        assert!(!err.to_string().contains("731"));
    }

    #[test]
    fn test_large_balances() {
        let oracle = SimulatedOracle::new();
        let salt = OracleSalt::new(977, 499).unwrap();
        let actual = 4_000_000;
        let upper = actual + 1_000;
        assert!(oracle.sufficient(50, actual, upper, &salt).unwrap());
        assert!(oracle.sufficient(actual, actual, upper, &salt).unwrap());
        assert!(!oracle.sufficient(actual + 1, actual, upper, &salt).unwrap());
    }

    #[test]
    fn test_salt_rejects_non_positive_blinding() {
        assert!(matches!(OracleSalt::new(3, 0), Err(CryptoError::InvalidSalt(_))));
        assert!(OracleSalt::new(3, -2).is_err());
    }

    #[test]
    fn test_random_salt_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let salt = OracleSalt::random(&mut rng);
            assert!(salt.blinding() >= 1 && salt.blinding() <= 500);
        }
    }
}
