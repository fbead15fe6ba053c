use std::time::Instant;

use pcn_core::{Amount, ChannelGraph, NodeId, PcnConfig};
use pcn_reputation::{PropagationConfig, ReputationPropagator};
use pcn_routing::{RouteValidator, ValidationReport};
use pcn_settlement::{HtlcEngine, HtlcEngineConfig, SettlementOutcome, SettlementReceipt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::topology::{create_network, mark_dishonest};

/// Counters for one trial (or several, once merged).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialStats {
    pub payments: u64,
    pub settled: u64,
    pub rolled_back: u64,
    /// Payments for which no valid path was found.
    pub unroutable: u64,
    /// Candidate paths evaluated by the validator.
    pub path_attempts: u64,
    pub capacity_failures: u64,
    pub reputation_blocks: u64,
    pub propagation_rounds: u64,
    pub propagation_updates: u64,
    pub elapsed_secs: f64,
}

impl TrialStats {
    pub fn record_validation(&mut self, report: &ValidationReport) {
        self.payments += 1;
        self.path_attempts += report.attempts as u64;
        self.capacity_failures += report.capacity_failures as u64;
        self.reputation_blocks += report.reputation_blocks as u64;
        if report.path.is_none() {
            self.unroutable += 1;
        }
    }

    pub fn record_propagation(&mut self, updates: usize) {
        self.propagation_rounds += 1;
        self.propagation_updates += updates as u64;
    }

    pub fn record_receipt(&mut self, receipt: &SettlementReceipt) {
        match receipt.outcome {
            SettlementOutcome::Settled => self.settled += 1,
            SettlementOutcome::RolledBack { .. } | SettlementOutcome::Aborted => {
                self.rolled_back += 1
            }
        }
    }

    /// Settled payments over all payments issued.
    pub fn success_rate(&self) -> f64 {
        ratio(self.settled, self.payments)
    }

    /// Settled payments over every failed HTLC. A failed HTLC is a rollback
    /// or a candidate path rejected for capacity. Reputation blocks abandon
    /// the candidate without an HTLC and are not counted.
    pub fn htlc_success_rate(&self) -> f64 {
        let failed = self.rolled_back + self.capacity_failures;
        ratio(self.settled, self.settled + failed)
    }

    pub fn mean_attempts(&self) -> f64 {
        ratio(self.path_attempts, self.payments)
    }

    pub fn merge(&mut self, other: &TrialStats) {
        self.payments += other.payments;
        self.settled += other.settled;
        self.rolled_back += other.rolled_back;
        self.unroutable += other.unroutable;
        self.path_attempts += other.path_attempts;
        self.capacity_failures += other.capacity_failures;
        self.reputation_blocks += other.reputation_blocks;
        self.propagation_rounds += other.propagation_rounds;
        self.propagation_updates += other.propagation_updates;
        self.elapsed_secs += other.elapsed_secs;
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Results for every trial run at one malicious ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioSummary {
    pub malicious_ratio: f64,
    pub trials: Vec<TrialStats>,
    pub total: TrialStats,
}

impl RatioSummary {
    fn new(malicious_ratio: f64) -> Self {
        Self {
            malicious_ratio,
            trials: Vec::new(),
            total: TrialStats::default(),
        }
    }

    fn push(&mut self, stats: TrialStats) {
        self.total.merge(&stats);
        self.trials.push(stats);
    }
}

/// The experiment driver. Each trial owns its graph and its seeded RNG.
pub struct Simulation {
    config: PcnConfig,
    validator: RouteValidator,
    engine: HtlcEngine,
    propagator: Option<ReputationPropagator>,
}

impl Simulation {
    pub fn new(config: PcnConfig) -> Result<Self, SimError> {
        config.validate()?;
        let validator = RouteValidator::from_config(&config.routing);
        let engine = HtlcEngine::new(HtlcEngineConfig::from(&config.settlement));
        let propagator = if config.reputation.propagation_enabled {
            Some(ReputationPropagator::new(PropagationConfig::from(
                &config.reputation,
            ))?)
        } else {
            None
        };
        Ok(Self {
            config,
            validator,
            engine,
            propagator,
        })
    }

    pub fn config(&self) -> &PcnConfig {
        &self.config
    }

    /// Run every configured trial at every configured malicious ratio.
    ///
    /// Trial seeds are drawn from one master RNG seeded with `seed`, so a run
    /// is reproducible end to end.
    pub fn run(&self, seed: u64) -> Result<Vec<RatioSummary>, SimError> {
        let mut master = StdRng::seed_from_u64(seed);
        let mut summaries = Vec::with_capacity(self.config.experiment.malicious_ratios.len());

        for &malicious_ratio in &self.config.experiment.malicious_ratios {
            let mut summary = RatioSummary::new(malicious_ratio);
            for trial in 0..self.config.experiment.trials {
                let trial_seed: u64 = master.gen();
                let stats = self.run_trial(malicious_ratio, trial_seed)?;
                tracing::info!(
                    malicious_ratio,
                    trial,
                    settled = stats.settled,
                    rolled_back = stats.rolled_back,
                    unroutable = stats.unroutable,
                    success_rate = stats.success_rate(),
                    "trial complete"
                );
                summary.push(stats);
            }
            summaries.push(summary);
        }

        Ok(summaries)
    }

    /// Build a fresh network and replay `payments_per_trial` random payments.
    pub fn run_trial(&self, malicious_ratio: f64, seed: u64) -> Result<TrialStats, SimError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = &self.config.network;
        let dishonest = mark_dishonest(network.node_count, malicious_ratio, &mut rng);
        let mut graph = create_network(network, &dishonest, &mut rng)?;

        let started = Instant::now();
        let mut stats = TrialStats::default();
        for _ in 0..self.config.experiment.payments_per_trial {
            let (sender, receiver, amount) = self.random_payment(&mut rng);
            self.run_payment(&mut graph, sender, receiver, amount, &mut rng, &mut stats)?;
        }
        stats.elapsed_secs = started.elapsed().as_secs_f64();
        Ok(stats)
    }

    /// Validate, maybe propagate, then settle one payment.
    ///
    /// Propagation only runs when a valid path was found.
    pub fn run_payment<R: Rng + ?Sized>(
        &self,
        graph: &mut ChannelGraph,
        sender: NodeId,
        receiver: NodeId,
        amount: Amount,
        rng: &mut R,
        stats: &mut TrialStats,
    ) -> Result<Option<SettlementReceipt>, SimError> {
        let report = self
            .validator
            .find_valid_path(graph, sender, receiver, amount, rng)?;
        stats.record_validation(&report);

        let Some(path) = report.path else {
            tracing::debug!(%sender, %receiver, amount, stop = ?report.stop, "payment unroutable");
            return Ok(None);
        };

        if let Some(propagator) = &self.propagator {
            if let Some(updates) = propagator.maybe_propagate(graph, rng) {
                stats.record_propagation(updates);
            }
        }

        let receipt = self.engine.settle(graph, &path, amount, rng)?;
        stats.record_receipt(&receipt);
        Ok(Some(receipt))
    }

    fn random_payment<R: Rng + ?Sized>(&self, rng: &mut R) -> (NodeId, NodeId, Amount) {
        let nodes = self.config.network.node_count;
        let sender = rng.gen_range(0..nodes);
        let mut receiver = rng.gen_range(0..nodes);
        while receiver == sender {
            receiver = rng.gen_range(0..nodes);
        }
        let amount = rng.gen_range(1..=self.config.experiment.max_send_amount);
        (NodeId(sender), NodeId(receiver), amount)
    }
}
