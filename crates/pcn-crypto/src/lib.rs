//! PCN Crypto — hash locks for HTLC settlement and the balance comparison
//! oracle used for private capacity checks.

pub mod error;
pub mod hashing;
pub mod oracle;

pub use error::CryptoError;
pub use hashing::{hash, Hash, HashLock, Preimage};
pub use oracle::{BalanceComparison, OracleSalt, SimulatedOracle};
