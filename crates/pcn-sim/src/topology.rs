use std::collections::BTreeSet;

use pcn_core::{ChannelGraph, CoreError, NetworkConfig, NodeId};
use rand::seq::index;
use rand::Rng;

/// Pick `floor(node_count * ratio)` distinct nodes to behave dishonestly.
pub fn mark_dishonest<R: Rng + ?Sized>(node_count: u32, ratio: f64, rng: &mut R) -> BTreeSet<NodeId> {
    let total = node_count as usize;
    let count = ((node_count as f64) * ratio.clamp(0.0, 1.0)).floor() as usize;
    index::sample(rng, total, count.min(total))
        .into_iter()
        .map(|i| NodeId(i as u32))
        .collect()
}

/// Build a random network of `config.node_count` nodes joined by
/// `config.channel_count` bilateral channels.
///
/// Every channel links a distinct unordered pair and each direction draws its
/// own balance from `[min_channel_balance, max_channel_balance]`. Nodes in
/// `dishonest` are created dishonest.
pub fn create_network<R: Rng + ?Sized>(
    config: &NetworkConfig,
    dishonest: &BTreeSet<NodeId>,
    rng: &mut R,
) -> Result<ChannelGraph, CoreError> {
    let node_count = config.node_count;
    let max_pairs = node_count as u64 * (node_count.saturating_sub(1)) as u64 / 2;
    if node_count < 2 || config.channel_count as u64 > max_pairs {
        return Err(CoreError::InvalidConfig(format!(
            "cannot place {} channels between {} nodes",
            config.channel_count, node_count
        )));
    }
    if config.min_channel_balance > config.max_channel_balance {
        return Err(CoreError::InvalidConfig(
            "channel balance range is empty".into(),
        ));
    }

    let mut graph = ChannelGraph::new();
    for id in 0..node_count {
        let node = NodeId(id);
        graph.add_node(node, !dishonest.contains(&node))?;
    }

    let balances = config.min_channel_balance..=config.max_channel_balance;
    let mut opened = 0;
    while opened < config.channel_count {
        let a = NodeId(rng.gen_range(0..node_count));
        let b = NodeId(rng.gen_range(0..node_count));
        if a == b || graph.has_channel(a, b) || graph.has_channel(b, a) {
            continue;
        }
        let ab = rng.gen_range(balances.clone());
        let ba = rng.gen_range(balances.clone());
        graph.open_channel(a, b, ab, ba)?;
        opened += 1;
    }

    tracing::debug!(
        nodes = graph.node_count(),
        channels = opened,
        dishonest = dishonest.len(),
        "network created"
    );
    Ok(graph)
}
