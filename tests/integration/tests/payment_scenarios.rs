//! Integration test: validate-then-settle across routing, settlement, and core.

use pcn_core::{ChannelGraph, HtlcState, NodeId, Path, PathStrategy, RoutingConfig, CapacityCheckMode};
use pcn_crypto::{HashLock, Preimage};
use pcn_integration_tests::{balances, line_network, seeded};
use pcn_routing::{
    CapacityCheck, PathFinder, RouteRejection, RouteValidator, ValidationStop, ValidatorConfig,
};
use pcn_settlement::{HtlcEngine, PaymentAttempt, SettlementOutcome};

fn direct_validator() -> RouteValidator {
    RouteValidator::new(PathFinder::with_defaults(), ValidatorConfig::default())
}

fn oracle_validator() -> RouteValidator {
    RouteValidator::from_config(&RoutingConfig {
        capacity_check: CapacityCheckMode::Oracle,
        ..RoutingConfig::default()
    })
}

// =========================================================================
// Happy path
// =========================================================================

#[test]
fn test_happy_path_settles() {
    let mut graph = line_network(&[100, 100, 100], &[]);
    let mut rng = seeded(1);

    let report = direct_validator()
        .find_valid_path(&graph, NodeId(0), NodeId(3), 50, &mut rng)
        .unwrap();
    let path = report.path.expect("line is routable");
    assert_eq!(path, Path::from_ids(&[0, 1, 2, 3]).unwrap());

    let receipt = HtlcEngine::with_defaults()
        .settle(&mut graph, &path, 50, &mut rng)
        .unwrap();
    assert_eq!(receipt.outcome, SettlementOutcome::Settled);

    for id in 0..3 {
        assert_eq!(graph.balance(NodeId(id), NodeId(id + 1)), 50);
        assert_eq!(graph.balance(NodeId(id + 1), NodeId(id)), 150);
    }
    let ratings = graph.reputation(NodeId(0)).unwrap();
    assert_eq!(ratings.get(NodeId(1)), Some(1));
    assert_eq!(ratings.get(NodeId(2)), Some(1));
    assert_eq!(ratings.get(NodeId(3)), Some(1));
}

#[test]
fn test_happy_path_through_oracle() {
    let mut graph = line_network(&[100, 100, 100], &[]);
    let mut rng = seeded(2);

    let report = oracle_validator()
        .find_valid_path(&graph, NodeId(0), NodeId(3), 50, &mut rng)
        .unwrap();
    let path = report.path.unwrap();
    let receipt = HtlcEngine::with_defaults()
        .settle(&mut graph, &path, 50, &mut rng)
        .unwrap();
    assert!(receipt.is_success());
}

// =========================================================================
// Dishonest hop
// =========================================================================

#[test]
fn test_dishonest_hop_rolls_back() {
    let mut graph = line_network(&[100, 100, 100], &[2]);
    let before = balances(&graph);
    let mut rng = seeded(3);

    let path = direct_validator()
        .find_valid_path(&graph, NodeId(0), NodeId(3), 50, &mut rng)
        .unwrap()
        .path
        .unwrap();
    let receipt = HtlcEngine::with_defaults()
        .settle(&mut graph, &path, 50, &mut rng)
        .unwrap();

    assert_eq!(
        receipt.outcome,
        SettlementOutcome::RolledBack {
            uncooperative: NodeId(2)
        }
    );
    assert_eq!(balances(&graph), before);
    assert_eq!(graph.reputation(NodeId(0)).unwrap().get(NodeId(2)), Some(-1));
}

#[test]
fn test_distrusted_node_blocks_the_next_payment() {
    let mut graph = line_network(&[100, 100, 100], &[2]);
    let mut rng = seeded(4);
    let validator = direct_validator();
    let engine = HtlcEngine::with_defaults();

    let path = validator
        .find_valid_path(&graph, NodeId(0), NodeId(3), 10, &mut rng)
        .unwrap()
        .path
        .unwrap();
    engine.settle(&mut graph, &path, 10, &mut rng).unwrap();

    let report = validator
        .find_valid_path(&graph, NodeId(0), NodeId(3), 10, &mut rng)
        .unwrap();
    assert!(report.path.is_none());
    assert_eq!(
        report.rejections,
        vec![RouteRejection::ReputationBlocked { node: NodeId(2) }]
    );
}

#[test]
fn test_reputation_gate_reroutes_around_distrusted_node() {
    // 0 -> 1 -> 3 is shorter than 0 -> 2 -> 4 -> 3 but node 1 is dishonest.
    let mut graph = ChannelGraph::new();
    for id in 0..5 {
        graph.add_node(NodeId(id), id != 1).unwrap();
    }
    for (a, b) in [(0, 1), (1, 3), (0, 2), (2, 4), (4, 3)] {
        graph.open_channel(NodeId(a), NodeId(b), 100, 100).unwrap();
    }
    let mut rng = seeded(5);
    let validator = direct_validator();
    let engine = HtlcEngine::with_defaults();

    let first = validator
        .find_valid_path(&graph, NodeId(0), NodeId(3), 10, &mut rng)
        .unwrap()
        .path
        .unwrap();
    assert_eq!(first, Path::from_ids(&[0, 1, 3]).unwrap());
    let receipt = engine.settle(&mut graph, &first, 10, &mut rng).unwrap();
    assert!(!receipt.is_success());

    let report = validator
        .find_valid_path(&graph, NodeId(0), NodeId(3), 10, &mut rng)
        .unwrap();
    assert_eq!(report.reputation_blocks, 1);
    let second = report.path.unwrap();
    assert_eq!(second, Path::from_ids(&[0, 2, 4, 3]).unwrap());
    assert!(engine.settle(&mut graph, &second, 10, &mut rng).unwrap().is_success());
}

// =========================================================================
// Capacity exhaustion
// =========================================================================

#[test]
fn test_capacity_exhaustion_never_settles() {
    let graph = line_network(&[100, 10, 100], &[]);
    let before = balances(&graph);

    for validator in [direct_validator(), oracle_validator()] {
        let report = validator
            .find_valid_path(&graph, NodeId(0), NodeId(3), 50, &mut seeded(6))
            .unwrap();
        assert!(report.path.is_none());
        assert_eq!(report.stop, ValidationStop::NoPathFound);
        assert_eq!(report.capacity_failures, 1);
    }
    assert_eq!(balances(&graph), before);
}

#[test]
fn test_weighted_strategy_agrees_on_line() {
    let graph = line_network(&[100, 100], &[]);
    let validator = RouteValidator::new(
        PathFinder::new(pcn_routing::PathFinderConfig {
            strategy: PathStrategy::CapacityWeighted,
            hop_cost: 2,
        }),
        ValidatorConfig {
            capacity_check: CapacityCheck::Oracle { headroom: 10 },
            ..ValidatorConfig::default()
        },
    );
    let report = validator
        .find_valid_path(&graph, NodeId(0), NodeId(2), 100, &mut seeded(7))
        .unwrap();
    assert_eq!(report.path.unwrap(), Path::from_ids(&[0, 1, 2]).unwrap());
}

// =========================================================================
// Step-by-step attempt
// =========================================================================

#[test]
fn test_attempt_steps_and_single_shot_rollback() {
    let mut graph = line_network(&[100, 100, 100], &[1]);
    let before = balances(&graph);
    let mut attempt =
        PaymentAttempt::new(Path::from_ids(&[0, 1, 2, 3]).unwrap(), 25, &mut seeded(8)).unwrap();

    attempt.lock(&mut graph).unwrap();
    assert_eq!(attempt.state(), HtlcState::Revealing);
    assert_eq!(graph.balance(NodeId(2), NodeId(3)), 75);

    let outcome = attempt.reveal(&mut graph).unwrap();
    assert_eq!(
        outcome,
        SettlementOutcome::RolledBack {
            uncooperative: NodeId(1)
        }
    );
    assert_eq!(balances(&graph), before);

    assert!(attempt.rollback(&mut graph).is_err());
    assert_eq!(balances(&graph), before);
}

#[test]
fn test_receiver_with_wrong_preimage_is_blamed() {
    let mut graph = line_network(&[60, 60], &[]);
    let before = balances(&graph);
    let committed = Preimage::from_bytes([7u8; 32]);
    let handed_over = Preimage::from_bytes([8u8; 32]);

    let mut attempt = PaymentAttempt::with_preimage(
        Path::from_ids(&[0, 1, 2]).unwrap(),
        30,
        committed.hash_lock(),
        handed_over,
    )
    .unwrap();
    attempt.lock(&mut graph).unwrap();
    let outcome = attempt.reveal(&mut graph).unwrap();

    assert_eq!(
        outcome,
        SettlementOutcome::RolledBack {
            uncooperative: NodeId(2)
        }
    );
    assert!(!attempt.knows_preimage(NodeId(2)));
    assert_eq!(balances(&graph), before);
}

#[test]
fn test_matching_preimage_settles_under_its_lock() {
    let mut graph = line_network(&[60, 60], &[]);
    let preimage = Preimage::from_bytes([7u8; 32]);
    let lock = preimage.hash_lock();

    let mut attempt =
        PaymentAttempt::with_preimage(Path::from_ids(&[0, 1, 2]).unwrap(), 30, lock, preimage)
            .unwrap();
    attempt.lock(&mut graph).unwrap();
    assert_eq!(attempt.reveal(&mut graph).unwrap(), SettlementOutcome::Settled);
    assert!(attempt.knows_preimage(NodeId(0)));
    assert_eq!(HashLock::from_hex(&attempt.hash_lock().to_hex()).unwrap(), lock);
    assert_eq!(graph.balance(NodeId(1), NodeId(0)), 90);
}

#[test]
fn test_receipt_serializes() {
    let mut graph = line_network(&[40], &[]);
    let receipt = HtlcEngine::with_defaults()
        .settle(&mut graph, &Path::from_ids(&[0, 1]).unwrap(), 40, &mut seeded(9))
        .unwrap();
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["amount"], 40);
    assert_eq!(json["outcome"], "Settled");
    assert_eq!(json["path"]["nodes"], serde_json::json!([0, 1]));
}
