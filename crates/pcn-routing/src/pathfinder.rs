use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use pcn_core::{ChannelGraph, Edge, NodeId, Path, PathStrategy, RoutingConfig};

/// Directed edges hidden from the path search.
pub type ExclusionSet = BTreeSet<Edge>;

/// Configuration for the PathFinder.
#[derive(Debug, Clone)]
pub struct PathFinderConfig {
    /// Which search to run.
    pub strategy: PathStrategy,
    /// Cost of traversing one channel under [`PathStrategy::CapacityWeighted`].
    pub hop_cost: u64,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self {
            strategy: PathStrategy::Unweighted,
            hop_cost: 1,
        }
    }
}

impl From<&RoutingConfig> for PathFinderConfig {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            strategy: config.strategy,
            hop_cost: config.hop_cost,
        }
    }
}

/// The PathFinder discovers sender→receiver paths over a filtered view of the
/// channel graph. Excluded edges are treated as absent; the graph itself is
/// never touched.
///
/// Tie-breaks are deterministic: neighbors are expanded in ascending id order,
/// and the weighted search pops equal-cost frontier nodes lowest id first.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    config: PathFinderConfig,
}

/// Frontier entry for the weighted search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchNode {
    cost: u64,
    node: NodeId,
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert so the cheapest, then lowest id, pops first.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PathFinder {
    /// Create a new PathFinder with the given configuration.
    pub fn new(config: PathFinderConfig) -> Self {
        Self { config }
    }

    /// Create a PathFinder with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    /// Find a path from `sender` to `receiver` avoiding `excluded`.
    ///
    /// Returns `None` when either endpoint is absent, when they coincide, or
    /// when the filtered view disconnects them.
    pub fn find_path(
        &self,
        graph: &ChannelGraph,
        sender: NodeId,
        receiver: NodeId,
        excluded: &ExclusionSet,
    ) -> Option<Path> {
        if sender == receiver || !graph.contains_node(sender) || !graph.contains_node(receiver) {
            return None;
        }

        let path = match self.config.strategy {
            PathStrategy::Unweighted => Self::bfs(graph, sender, receiver, excluded),
            PathStrategy::CapacityWeighted => {
                Self::dijkstra(graph, sender, receiver, excluded, self.config.hop_cost)
            }
        };

        match &path {
            Some(p) => tracing::trace!(%sender, %receiver, hops = p.hop_count(), "path found"),
            None => tracing::trace!(%sender, %receiver, excluded = excluded.len(), "no path"),
        }
        path
    }

    /// Fewest-hop search.
    fn bfs(
        graph: &ChannelGraph,
        sender: NodeId,
        receiver: NodeId,
        excluded: &ExclusionSet,
    ) -> Option<Path> {
        let mut parent: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        visited.insert(sender);
        queue.push_back(sender);

        while let Some(current) = queue.pop_front() {
            if current == receiver {
                return Self::rebuild(&parent, sender, receiver);
            }
            for next in graph.neighbors(current) {
                if excluded.contains(&(current, next)) || !visited.insert(next) {
                    continue;
                }
                parent.insert(next, current);
                queue.push_back(next);
            }
        }

        None
    }

    /// Minimum-cost search with a uniform per-hop cost.
    fn dijkstra(
        graph: &ChannelGraph,
        sender: NodeId,
        receiver: NodeId,
        excluded: &ExclusionSet,
        hop_cost: u64,
    ) -> Option<Path> {
        let mut dist: BTreeMap<NodeId, u64> = BTreeMap::new();
        let mut parent: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut settled: BTreeSet<NodeId> = BTreeSet::new();
        let mut heap: BinaryHeap<SearchNode> = BinaryHeap::new();

        dist.insert(sender, 0);
        heap.push(SearchNode {
            cost: 0,
            node: sender,
        });

        while let Some(SearchNode { cost, node }) = heap.pop() {
            if !settled.insert(node) {
                continue;
            }
            if node == receiver {
                return Self::rebuild(&parent, sender, receiver);
            }

            for next in graph.neighbors(node) {
                if excluded.contains(&(node, next)) || settled.contains(&next) {
                    continue;
                }
                let next_cost = cost.saturating_add(hop_cost);
                let improves = dist.get(&next).map_or(true, |known| next_cost < *known);
                if improves {
                    dist.insert(next, next_cost);
                    parent.insert(next, node);
                    heap.push(SearchNode {
                        cost: next_cost,
                        node: next,
                    });
                }
            }
        }

        None
    }

    fn rebuild(parent: &BTreeMap<NodeId, NodeId>, sender: NodeId, receiver: NodeId) -> Option<Path> {
        let mut nodes = vec![receiver];
        let mut current = receiver;
        while current != sender {
            current = *parent.get(&current)?;
            nodes.push(current);
        }
        nodes.reverse();
        Path::new(nodes).ok()
    }
}
