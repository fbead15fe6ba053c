//! Shared fixtures for the cross-crate scenarios.

use pcn_core::{Amount, ChannelGraph, NodeId};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded RNG so every scenario is reproducible.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Line `0 -> 1 -> ... -> n` with one bilateral channel per consecutive pair.
///
/// `capacities[i]` is the balance of both directions between `i` and `i + 1`.
pub fn line_network(capacities: &[Amount], dishonest: &[u32]) -> ChannelGraph {
    let mut graph = ChannelGraph::new();
    for id in 0..=capacities.len() as u32 {
        graph
            .add_node(NodeId(id), !dishonest.contains(&id))
            .expect("fresh node ids");
    }
    for (i, capacity) in capacities.iter().enumerate() {
        let i = i as u32;
        graph
            .open_channel(NodeId(i), NodeId(i + 1), *capacity, *capacity)
            .expect("nodes exist");
    }
    graph
}

/// Snapshot of every directed balance, ordered by edge.
pub fn balances(graph: &ChannelGraph) -> Vec<((NodeId, NodeId), Amount)> {
    graph.channels().collect()
}
