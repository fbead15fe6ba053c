//! Integration test: randomized sweeps over seeded networks.
//!
//! Every resolved attempt must leave the total balance unchanged, and every
//! rollback must put each touched channel back exactly where it was.

use std::collections::BTreeSet;

use pcn_core::{NetworkConfig, NodeId, PcnConfig, CapacityCheckMode};
use pcn_integration_tests::{balances, seeded};
use pcn_reputation::ReputationPropagator;
use pcn_routing::RouteValidator;
use pcn_settlement::{HtlcEngine, SettlementOutcome};
use pcn_sim::{create_network, mark_dishonest, Simulation, TrialStats};
use rand::Rng;

fn network() -> NetworkConfig {
    NetworkConfig {
        node_count: 30,
        channel_count: 80,
        min_channel_balance: 1,
        max_channel_balance: 200,
    }
}

fn sweep(capacity_check: CapacityCheckMode, seed: u64) {
    let mut rng = seeded(seed);
    let dishonest = mark_dishonest(30, 0.2, &mut rng);
    let mut graph = create_network(&network(), &dishonest, &mut rng).unwrap();

    let mut config = PcnConfig::default();
    config.routing.capacity_check = capacity_check;
    let validator = RouteValidator::from_config(&config.routing);
    let engine = HtlcEngine::with_defaults();
    let propagator = ReputationPropagator::with_defaults();

    let total = graph.total_balance();
    let mut settled = 0;
    let mut rolled_back = 0;

    for _ in 0..300 {
        let sender = NodeId(rng.gen_range(0..30));
        let receiver = NodeId(rng.gen_range(0..30));
        if sender == receiver {
            continue;
        }
        let amount = rng.gen_range(1..=100);

        let report = validator
            .find_valid_path(&graph, sender, receiver, amount, &mut rng)
            .unwrap();
        let Some(path) = report.path else {
            continue;
        };
        propagator.maybe_propagate(&mut graph, &mut rng);

        let before = balances(&graph);
        let receipt = engine.settle(&mut graph, &path, amount, &mut rng).unwrap();
        assert_eq!(graph.total_balance(), total, "conservation after {:?}", receipt.outcome);

        match receipt.outcome {
            SettlementOutcome::Settled => settled += 1,
            SettlementOutcome::Aborted => panic!("the engine never aborts on its own"),
            SettlementOutcome::RolledBack { uncooperative } => {
                rolled_back += 1;
                assert_eq!(balances(&graph), before, "rollback restores every channel");
                assert!(path.downstream().contains(&uncooperative));
                assert!(!graph.is_honest(uncooperative));
            }
        }
    }

    assert!(settled > 0, "seed {} settled nothing", seed);
    assert!(settled + rolled_back > 0);
}

#[test]
fn test_conservation_direct_checks() {
    for seed in [1, 2, 3] {
        sweep(CapacityCheckMode::Direct, seed);
    }
}

#[test]
fn test_conservation_oracle_checks() {
    for seed in [4, 5, 6] {
        sweep(CapacityCheckMode::Oracle, seed);
    }
}

#[test]
fn test_direct_mode_never_overdraws() {
    let mut rng = seeded(10);
    let mut graph = create_network(&network(), &BTreeSet::new(), &mut rng).unwrap();
    let validator = RouteValidator::from_config(&PcnConfig::default().routing);
    let engine = HtlcEngine::with_defaults();

    for _ in 0..300 {
        let sender = NodeId(rng.gen_range(0..30));
        let receiver = NodeId(rng.gen_range(0..30));
        let amount = rng.gen_range(1..=100);
        if sender == receiver {
            continue;
        }
        if let Some(path) = validator
            .find_valid_path(&graph, sender, receiver, amount, &mut rng)
            .unwrap()
            .path
        {
            engine.settle(&mut graph, &path, amount, &mut rng).unwrap();
        }
        assert!(graph.channels().all(|(_, balance)| balance >= 0));
    }
}

#[test]
fn test_simulation_totals_are_consistent() {
    let mut config = PcnConfig::default();
    config.network = network();
    config.experiment.trials = 2;
    config.experiment.payments_per_trial = 100;
    config.experiment.malicious_ratios = vec![0.0, 0.3];

    let summaries = Simulation::new(config).unwrap().run(42).unwrap();
    assert_eq!(summaries.len(), 2);

    for summary in &summaries {
        let mut merged = TrialStats::default();
        for trial in &summary.trials {
            assert_eq!(trial.settled + trial.rolled_back + trial.unroutable, 100);
            merged.merge(trial);
        }
        assert_eq!(merged.settled, summary.total.settled);
        assert_eq!(merged.payments, 200);
    }
    assert_eq!(summaries[0].total.rolled_back, 0);

    let json = serde_json::to_string(&summaries).unwrap();
    assert!(json.contains("malicious_ratio"));
}
