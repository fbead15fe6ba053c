use std::collections::BTreeMap;

use pcn_core::{ChannelGraph, NodeId, ReputationConfig, ReputationTable, Score};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ReputationError;

/// Configuration for the ReputationPropagator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Lower bound of the per-node trust threshold draw.
    pub min_threshold: Score,
    /// Upper bound (inclusive) of the per-node trust threshold draw.
    pub max_threshold: Score,
    /// Chance that [`ReputationPropagator::maybe_propagate`] runs a round.
    pub update_probability: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            min_threshold: 0,
            max_threshold: 1,
            update_probability: 0.9,
        }
    }
}

impl From<&ReputationConfig> for PropagationConfig {
    fn from(config: &ReputationConfig) -> Self {
        Self {
            min_threshold: config.min_threshold,
            max_threshold: config.max_threshold,
            update_probability: config.update_probability,
        }
    }
}

/// Spreads reputation one hop per round.
///
/// For every node N with a non-empty table a threshold `t` is drawn from
/// `[min_threshold, max_threshold]`. Each outgoing neighbor M that N scores
/// `>= t` offers its entries; N adopts the ones it lacks as `+1` (M's score
/// `>= t`) or `-1` (M's score `<= -t`). Neighbors are consulted lowest id
/// first and an existing entry is never overwritten.
///
/// Offers are read from a snapshot taken before the round, so an opinion
/// travels exactly one hop per call.
#[derive(Debug, Clone)]
pub struct ReputationPropagator {
    config: PropagationConfig,
}

impl ReputationPropagator {
    pub fn new(config: PropagationConfig) -> Result<Self, ReputationError> {
        if config.min_threshold > config.max_threshold {
            return Err(ReputationError::EmptyThresholdRange {
                min: config.min_threshold,
                max: config.max_threshold,
            });
        }
        if !(0.0..=1.0).contains(&config.update_probability) {
            return Err(ReputationError::InvalidProbability(config.update_probability));
        }
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: PropagationConfig::default(),
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Run one round with probability `update_probability`.
    ///
    /// Returns `None` when the round was skipped.
    pub fn maybe_propagate<R: Rng + ?Sized>(
        &self,
        graph: &mut ChannelGraph,
        rng: &mut R,
    ) -> Option<usize> {
        if !rng.gen_bool(self.config.update_probability) {
            tracing::trace!("propagation round skipped");
            return None;
        }
        Some(self.propagate(graph, rng))
    }

    /// Run one round. Returns the number of adopted entries.
    pub fn propagate<R: Rng + ?Sized>(&self, graph: &mut ChannelGraph, rng: &mut R) -> usize {
        let snapshot: BTreeMap<NodeId, ReputationTable> = graph
            .node_ids()
            .filter_map(|id| graph.reputation(id).map(|table| (id, table.clone())))
            .collect();

        let mut plan: Vec<(NodeId, Vec<(NodeId, Score)>)> = Vec::new();
        for (&node, own) in &snapshot {
            if own.is_empty() {
                continue;
            }
            let threshold = rng.gen_range(self.config.min_threshold..=self.config.max_threshold);
            let mut adopted = own.clone();
            let mut offers = Vec::new();

            for neighbor in graph.neighbors(node) {
                if !own.get(neighbor).is_some_and(|score| score >= threshold) {
                    continue;
                }
                let Some(theirs) = snapshot.get(&neighbor) else {
                    continue;
                };
                for (peer, score) in theirs.iter() {
                    if peer == node || peer == neighbor {
                        continue;
                    }
                    let Some(canonical) = Self::canonicalize(score, threshold) else {
                        continue;
                    };
                    if adopted.adopt(peer, canonical) {
                        offers.push((peer, canonical));
                    }
                }
            }

            if !offers.is_empty() {
                tracing::debug!(%node, threshold, adopted = offers.len(), "reputation adopted");
                plan.push((node, offers));
            }
        }

        let mut updates = 0;
        for (node, offers) in plan {
            let Some(table) = graph.reputation_mut(node) else {
                continue;
            };
            for (peer, score) in offers {
                if table.adopt(peer, score) {
                    updates += 1;
                }
            }
        }

        tracing::trace!(updates, "propagation round complete");
        updates
    }

    fn canonicalize(score: Score, threshold: Score) -> Option<Score> {
        if score >= threshold {
            Some(1)
        } else if score <= -threshold {
            Some(-1)
        } else {
            None
        }
    }
}
