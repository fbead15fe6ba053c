use pcn_core::{Amount, NodeId, Path};
use pcn_crypto::HashLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    /// Create a new attempt ID (UUID v7 — time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a payment attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// The preimage reached the sender; every hop keeps its reverse credit.
    Settled,
    /// `uncooperative` did not know the preimage or refused to pass it on.
    /// Every balance touched by the attempt was restored.
    RolledBack { uncooperative: NodeId },
    /// The caller rolled the attempt back mid-reveal. No node is blamed.
    Aborted,
}

impl std::fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Settled => write!(f, "Settled"),
            Self::RolledBack { uncooperative } => write!(f, "RolledBack({})", uncooperative),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Record of one resolved payment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub attempt_id: AttemptId,
    /// Hash lock the attempt was committed to.
    pub hash_lock: HashLock,
    pub path: Path,
    pub amount: Amount,
    pub outcome: SettlementOutcome,
}

impl SettlementReceipt {
    pub fn is_success(&self) -> bool {
        self.outcome == SettlementOutcome::Settled
    }
}
