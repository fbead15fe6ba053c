//! Integration test: settlement outcomes feeding reputation, and reputation
//! spreading to neighbors that then route around the offender.

use pcn_core::NodeId;
use pcn_integration_tests::{line_network, seeded};
use pcn_reputation::{PropagationConfig, ReputationPropagator};
use pcn_routing::{RouteRejection, RouteValidator};
use pcn_settlement::HtlcEngine;

fn always() -> ReputationPropagator {
    ReputationPropagator::new(PropagationConfig {
        min_threshold: 1,
        max_threshold: 1,
        update_probability: 1.0,
    })
    .unwrap()
}

#[test]
fn test_distrust_spreads_to_trusting_neighbor() {
    // 0 - 1 - 2 - 3 - 4, node 3 dishonest.
    let mut graph = line_network(&[100, 100, 100, 100], &[3]);
    let mut rng = seeded(21);
    let validator = RouteValidator::from_config(&Default::default());
    let engine = HtlcEngine::with_defaults();

    // Node 1 learns to trust 2 ...
    let path = validator
        .find_valid_path(&graph, NodeId(1), NodeId(2), 5, &mut rng)
        .unwrap()
        .path
        .unwrap();
    assert!(engine.settle(&mut graph, &path, 5, &mut rng).unwrap().is_success());

    // ... and node 2 learns to distrust 3.
    let path = validator
        .find_valid_path(&graph, NodeId(2), NodeId(4), 5, &mut rng)
        .unwrap()
        .path
        .unwrap();
    assert!(!engine.settle(&mut graph, &path, 5, &mut rng).unwrap().is_success());
    assert_eq!(graph.reputation(NodeId(2)).unwrap().get(NodeId(3)), Some(-1));

    // Before propagation node 1 still routes through 3.
    assert!(validator
        .find_valid_path(&graph, NodeId(1), NodeId(4), 5, &mut rng)
        .unwrap()
        .path
        .is_some());

    let updates = always().propagate(&mut graph, &mut rng);
    assert!(updates >= 1);
    assert_eq!(graph.reputation(NodeId(1)).unwrap().get(NodeId(3)), Some(-1));

    let report = validator
        .find_valid_path(&graph, NodeId(1), NodeId(4), 5, &mut rng)
        .unwrap();
    assert!(report.path.is_none());
    assert!(report
        .rejections
        .contains(&RouteRejection::ReputationBlocked { node: NodeId(3) }));
}

#[test]
fn test_success_scores_cover_whole_path() {
    let mut graph = line_network(&[50, 50, 50, 50], &[]);
    let mut rng = seeded(22);
    let validator = RouteValidator::from_config(&Default::default());
    let engine = HtlcEngine::with_defaults();

    for _ in 0..3 {
        let path = validator
            .find_valid_path(&graph, NodeId(0), NodeId(4), 5, &mut rng)
            .unwrap()
            .path
            .unwrap();
        engine.settle(&mut graph, &path, 5, &mut rng).unwrap();
    }

    let ratings = graph.reputation(NodeId(0)).unwrap();
    for id in 1..=4 {
        assert_eq!(ratings.get(NodeId(id)), Some(3));
    }
    assert_eq!(ratings.get(NodeId(0)), None);
}
