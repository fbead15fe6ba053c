use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Channel balances and payment values in atomic units.
///
/// Signed because a balance may transiently go negative while an attempt
/// is locked over a hop whose owner misreported its capacity.
pub type Amount = i64;

/// Signed reputation score a node keeps for a peer.
/// Positive = trusted, negative = distrusted.
pub type Score = i64;

/// A directed channel reference `(from, to)`.
pub type Edge = (NodeId, NodeId);

/// Identifier of a network participant.
///
/// Ordering on `NodeId` is the tie-break used everywhere a deterministic
/// choice between peers is required (lowest id first).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw numeric id.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// An ordered sequence of nodes, sender first and receiver last.
///
/// A `Path` always has at least two nodes and never repeats a node.
/// Whether every consecutive pair is an actual channel is checked against a
/// concrete graph by [`crate::ChannelGraph::validate_path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    nodes: Vec<NodeId>,
}

/// Wire shape of a [`Path`]; re-validated through [`Path::new`].
#[derive(Deserialize)]
struct RawPath {
    nodes: Vec<NodeId>,
}

impl TryFrom<RawPath> for Path {
    type Error = CoreError;

    fn try_from(raw: RawPath) -> Result<Self, Self::Error> {
        Path::new(raw.nodes)
    }
}

impl Path {
    /// Build a path from its node sequence.
    pub fn new(nodes: Vec<NodeId>) -> Result<Self, CoreError> {
        if nodes.len() < 2 {
            return Err(CoreError::InvalidPath(format!(
                "a path needs at least 2 nodes, got {}",
                nodes.len()
            )));
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].contains(node) {
                return Err(CoreError::InvalidPath(format!(
                    "node {} appears more than once",
                    node
                )));
            }
        }
        Ok(Self { nodes })
    }

    /// Build a path from raw ids. Convenience for tests and drivers.
    pub fn from_ids(ids: &[u32]) -> Result<Self, CoreError> {
        Self::new(ids.iter().copied().map(NodeId).collect())
    }

    /// The first node (payer).
    pub fn sender(&self) -> NodeId {
        self.nodes[0]
    }

    /// The last node (payee).
    pub fn receiver(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// All nodes in order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Nodes after the sender (intermediaries and the receiver).
    pub fn downstream(&self) -> &[NodeId] {
        &self.nodes[1..]
    }

    /// Consecutive `(u, v)` pairs in path order.
    pub fn hops(&self) -> impl DoubleEndedIterator<Item = Edge> + ExactSizeIterator + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }

    /// Number of channels traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the path visits `node`.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}
