use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::reputation::ReputationTable;
use crate::types::{Amount, Edge, NodeId, Path};

/// A network participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    /// Fixed at creation. A dishonest node never passes a preimage upstream.
    honest: bool,
    /// This node's view of its peers.
    reputation: ReputationTable,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_honest(&self) -> bool {
        self.honest
    }

    pub fn reputation(&self) -> &ReputationTable {
        &self.reputation
    }
}

/// A directed, capacity-bounded channel `u -> v`.
///
/// The reverse direction is a separate `Channel` with its own balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Capacity currently available for forwarding from `u` to `v`.
    pub balance: Amount,
}

/// Directed graph of participants and channels.
///
/// Adjacency is kept in ordered maps so that neighbor iteration is always
/// ascending by [`NodeId`]; path search relies on that for deterministic
/// tie-breaks.
///
/// `credit` and `debit` apply unconditionally. Callers validate sufficiency
/// before debiting; this is what lets a rollback restore a balance that a
/// misbehaving hop drove below zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelGraph {
    nodes: BTreeMap<NodeId, Node>,
    channels: BTreeMap<NodeId, BTreeMap<NodeId, Channel>>,
}

impl ChannelGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant with a fixed honesty flag and an empty reputation table.
    pub fn add_node(&mut self, id: NodeId, honest: bool) -> Result<(), CoreError> {
        if self.nodes.contains_key(&id) {
            return Err(CoreError::DuplicateNode(id));
        }
        self.nodes.insert(
            id,
            Node {
                id,
                honest,
                reputation: ReputationTable::new(),
            },
        );
        self.channels.entry(id).or_default();
        Ok(())
    }

    /// Add the directed channel `from -> to`.
    pub fn add_channel(&mut self, from: NodeId, to: NodeId, balance: Amount) -> Result<(), CoreError> {
        if !self.nodes.contains_key(&from) {
            return Err(CoreError::UnknownNode(from));
        }
        if !self.nodes.contains_key(&to) {
            return Err(CoreError::UnknownNode(to));
        }
        if from == to {
            return Err(CoreError::InvalidChannel {
                from,
                to,
                reason: "self-loop".into(),
            });
        }
        let out = self.channels.entry(from).or_default();
        if out.contains_key(&to) {
            return Err(CoreError::InvalidChannel {
                from,
                to,
                reason: "channel already exists".into(),
            });
        }
        out.insert(to, Channel { balance });
        Ok(())
    }

    /// Open a bilateral channel: two independent directed edges.
    pub fn open_channel(
        &mut self,
        a: NodeId,
        b: NodeId,
        balance_ab: Amount,
        balance_ba: Amount,
    ) -> Result<(), CoreError> {
        self.add_channel(a, b, balance_ab)?;
        self.add_channel(b, a, balance_ba)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn has_channel(&self, from: NodeId, to: NodeId) -> bool {
        self.channels
            .get(&from)
            .is_some_and(|out| out.contains_key(&to))
    }

    /// Current capacity of `from -> to`, or 0 when no such channel exists.
    pub fn balance(&self, from: NodeId, to: NodeId) -> Amount {
        self.channels
            .get(&from)
            .and_then(|out| out.get(&to))
            .map(|c| c.balance)
            .unwrap_or(0)
    }

    /// Outgoing channel peers of `node`, ascending by id.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.channels
            .get(&node)
            .into_iter()
            .flat_map(|out| out.keys().copied())
    }

    /// Add `delta` to `from -> to`. A missing channel is materialized at 0.
    pub fn credit(&mut self, from: NodeId, to: NodeId, delta: Amount) {
        self.adjust(from, to, delta);
    }

    /// Subtract `delta` from `from -> to`. No floor is enforced.
    pub fn debit(&mut self, from: NodeId, to: NodeId, delta: Amount) {
        self.adjust(from, to, -delta);
    }

    fn adjust(&mut self, from: NodeId, to: NodeId, delta: Amount) {
        self.channels
            .entry(from)
            .or_default()
            .entry(to)
            .and_modify(|c| c.balance += delta)
            .or_insert(Channel { balance: delta });
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Honesty flag of `id`. Unknown nodes are treated as dishonest.
    pub fn is_honest(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.honest)
    }

    pub fn reputation(&self, id: NodeId) -> Option<&ReputationTable> {
        self.nodes.get(&id).map(|n| &n.reputation)
    }

    pub fn reputation_mut(&mut self, id: NodeId) -> Option<&mut ReputationTable> {
        self.nodes.get_mut(&id).map(|n| &mut n.reputation)
    }

    /// All node ids, ascending.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All directed channels as `((from, to), balance)`, ordered by edge.
    pub fn channels(&self) -> impl Iterator<Item = (Edge, Amount)> + '_ {
        self.channels
            .iter()
            .flat_map(|(from, out)| out.iter().map(move |(to, c)| ((*from, *to), c.balance)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.values().map(|out| out.len()).sum()
    }

    /// Sum of every directed channel balance.
    pub fn total_balance(&self) -> i128 {
        self.channels().map(|(_, balance)| balance as i128).sum()
    }

    /// Check that every consecutive pair of `path` is an existing channel.
    pub fn validate_path(&self, path: &Path) -> Result<(), CoreError> {
        for node in path.nodes() {
            if !self.contains_node(*node) {
                return Err(CoreError::UnknownNode(*node));
            }
        }
        for (from, to) in path.hops() {
            if !self.has_channel(from, to) {
                return Err(CoreError::InvalidPath(format!(
                    "no channel {} -> {}",
                    from, to
                )));
            }
        }
        Ok(())
    }
}
