use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{NodeId, Score};

/// A node's private ledger of how much it trusts each peer it has dealt with.
///
/// Scores only move through three operations:
/// - [`record_success`](Self::record_success): +1 (or start at +1) after a
///   settled attempt,
/// - [`record_failure`](Self::record_failure): -1 (or start at -1) for the
///   first uncooperative hop of a rolled-back attempt,
/// - [`adopt`](Self::adopt): copy a canonical +1/-1 from a trusted neighbor,
///   only when no entry exists yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationTable {
    scores: BTreeMap<NodeId, Score>,
}

impl ReputationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The score held for `peer`, if any.
    pub fn get(&self, peer: NodeId) -> Option<Score> {
        self.scores.get(&peer).copied()
    }

    /// Whether an entry exists for `peer`.
    pub fn contains(&self, peer: NodeId) -> bool {
        self.scores.contains_key(&peer)
    }

    /// True when a score exists for `peer` and it is zero or negative.
    pub fn distrusts(&self, peer: NodeId) -> bool {
        self.get(peer).is_some_and(|score| score <= 0)
    }

    pub fn record_success(&mut self, peer: NodeId) -> Score {
        let score = self.scores.entry(peer).or_insert(0);
        *score += 1;
        *score
    }

    pub fn record_failure(&mut self, peer: NodeId) -> Score {
        let score = self.scores.entry(peer).or_insert(0);
        *score -= 1;
        *score
    }

    /// Insert `score` for `peer` unless an entry already exists.
    ///
    /// Returns whether the entry was adopted.
    pub fn adopt(&mut self, peer: NodeId, score: Score) -> bool {
        if self.scores.contains_key(&peer) {
            return false;
        }
        self.scores.insert(peer, score);
        true
    }

    /// Iterate entries in ascending peer order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Score)> + '_ {
        self.scores.iter().map(|(peer, score)| (*peer, *score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
