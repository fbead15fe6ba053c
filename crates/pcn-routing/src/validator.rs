use rand::Rng;
use serde::{Deserialize, Serialize};

use pcn_core::{Amount, CapacityCheckMode, ChannelGraph, NodeId, Path, RoutingConfig};
use pcn_crypto::{BalanceComparison, OracleSalt, SimulatedOracle};

use crate::error::RoutingError;
use crate::pathfinder::{ExclusionSet, PathFinder, PathFinderConfig};

/// How each hop's capacity is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityCheck {
    /// `balance(u, v) >= amount`, read directly.
    Direct,
    /// Ask the oracle with `upper_bound = balance + headroom`.
    /// Hops into a dishonest node are not checked: it would lie anyway.
    Oracle { headroom: Amount },
}

/// Configuration for the RouteValidator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum number of candidate paths evaluated per payment.
    pub max_attempts: u32,
    pub capacity_check: CapacityCheck,
    /// Reject paths through a next-hop node the sender scores `<= 0`.
    pub reputation_gate: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            capacity_check: CapacityCheck::Direct,
            reputation_gate: true,
        }
    }
}

impl From<&RoutingConfig> for ValidatorConfig {
    fn from(config: &RoutingConfig) -> Self {
        let capacity_check = match config.capacity_check {
            CapacityCheckMode::Direct => CapacityCheck::Direct,
            CapacityCheckMode::Oracle => CapacityCheck::Oracle {
                headroom: config.oracle_headroom,
            },
        };
        Self {
            max_attempts: config.max_attempts,
            capacity_check,
            reputation_gate: config.reputation_gate,
        }
    }
}

/// Why a candidate path was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteRejection {
    /// The sender holds a non-positive score for `node`.
    ReputationBlocked { node: NodeId },
    /// The hop `from -> to` cannot carry the amount.
    CapacityInsufficient { from: NodeId, to: NodeId },
}

/// Why the validation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStop {
    /// Every hop of `path` passed.
    Found,
    /// The filtered view no longer connects sender and receiver.
    NoPathFound,
    /// `max_attempts` candidate paths were rejected.
    AttemptsExhausted,
}

/// Outcome of one `find_valid_path` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// The validated path, if any.
    pub path: Option<Path>,
    /// Candidate paths evaluated.
    pub attempts: u32,
    /// Candidates rejected for capacity (direct or oracle).
    pub capacity_failures: u32,
    /// Candidates rejected by the reputation gate.
    pub reputation_blocks: u32,
    /// Every rejection, in the order it happened.
    pub rejections: Vec<RouteRejection>,
    pub stop: ValidationStop,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            path: None,
            attempts: 0,
            capacity_failures: 0,
            reputation_blocks: 0,
            rejections: Vec::new(),
            stop: ValidationStop::NoPathFound,
        }
    }

    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    fn reject(&mut self, rejection: RouteRejection) {
        match rejection {
            RouteRejection::ReputationBlocked { .. } => self.reputation_blocks += 1,
            RouteRejection::CapacityInsufficient { .. } => self.capacity_failures += 1,
        }
        self.rejections.push(rejection);
    }
}

/// Walks candidate paths hop by hop, pruning the search until a path passes
/// every reputation and capacity check or the attempt budget runs out.
///
/// The reputation gate is always applied to the hop's destination node `v`,
/// receiver included.
pub struct RouteValidator<C = SimulatedOracle> {
    finder: PathFinder,
    config: ValidatorConfig,
    oracle: C,
}

impl RouteValidator<SimulatedOracle> {
    /// Create a validator backed by the simulated oracle.
    pub fn new(finder: PathFinder, config: ValidatorConfig) -> Self {
        Self::with_oracle(finder, config, SimulatedOracle::new())
    }

    /// Build a validator from the routing section of the config file.
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(
            PathFinder::new(PathFinderConfig::from(config)),
            ValidatorConfig::from(config),
        )
    }
}

impl<C: BalanceComparison> RouteValidator<C> {
    /// Create a validator backed by a custom comparison backend.
    pub fn with_oracle(finder: PathFinder, config: ValidatorConfig, oracle: C) -> Self {
        Self {
            finder,
            config,
            oracle,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Find a path from `sender` to `receiver` able to carry `amount`.
    ///
    /// `rng` supplies the per-check oracle salts.
    pub fn find_valid_path<R: Rng + ?Sized>(
        &self,
        graph: &ChannelGraph,
        sender: NodeId,
        receiver: NodeId,
        amount: Amount,
        rng: &mut R,
    ) -> Result<ValidationReport, RoutingError> {
        if amount <= 0 {
            return Err(RoutingError::InvalidAmount(amount));
        }

        let mut report = ValidationReport::new();
        let mut excluded = ExclusionSet::new();

        while report.attempts < self.config.max_attempts {
            let Some(path) = self.finder.find_path(graph, sender, receiver, &excluded) else {
                report.stop = ValidationStop::NoPathFound;
                tracing::debug!(%sender, %receiver, attempts = report.attempts, "no path left");
                return Ok(report);
            };
            report.attempts += 1;

            match self.check_path(graph, &path, amount, rng)? {
                None => {
                    tracing::debug!(
                        %sender,
                        %receiver,
                        path = %path,
                        attempts = report.attempts,
                        "route validated"
                    );
                    report.path = Some(path);
                    report.stop = ValidationStop::Found;
                    return Ok(report);
                }
                Some(rejection) => {
                    let edge = match rejection {
                        RouteRejection::ReputationBlocked { node } => {
                            tracing::debug!(%sender, %node, "path blocked by reputation");
                            Self::edge_into(&path, node)
                        }
                        RouteRejection::CapacityInsufficient { from, to } => {
                            tracing::debug!(%from, %to, amount, "hop lacks capacity");
                            Some((from, to))
                        }
                    };
                    if let Some(edge) = edge {
                        excluded.insert(edge);
                    }
                    report.reject(rejection);
                }
            }
        }

        report.stop = ValidationStop::AttemptsExhausted;
        tracing::debug!(%sender, %receiver, attempts = report.attempts, "attempt budget exhausted");
        Ok(report)
    }

    /// First failing hop of `path`, or `None` when every hop passes.
    fn check_path<R: Rng + ?Sized>(
        &self,
        graph: &ChannelGraph,
        path: &Path,
        amount: Amount,
        rng: &mut R,
    ) -> Result<Option<RouteRejection>, RoutingError> {
        let sender = path.sender();
        let ratings = graph.reputation(sender);

        for (from, to) in path.hops() {
            if self.config.reputation_gate && ratings.is_some_and(|r| r.distrusts(to)) {
                return Ok(Some(RouteRejection::ReputationBlocked { node: to }));
            }
            if !self.hop_has_capacity(graph, from, to, amount, rng)? {
                return Ok(Some(RouteRejection::CapacityInsufficient { from, to }));
            }
        }
        Ok(None)
    }

    fn hop_has_capacity<R: Rng + ?Sized>(
        &self,
        graph: &ChannelGraph,
        from: NodeId,
        to: NodeId,
        amount: Amount,
        rng: &mut R,
    ) -> Result<bool, RoutingError> {
        let balance = graph.balance(from, to);
        match self.config.capacity_check {
            CapacityCheck::Direct => Ok(balance >= amount),
            CapacityCheck::Oracle { headroom } => {
                if !graph.is_honest(to) {
                    return Ok(true);
                }
                if balance < 0 {
                    return Ok(false);
                }
                let salt = OracleSalt::random(rng);
                let upper_bound = balance.saturating_add(headroom);
                Ok(self.oracle.sufficient(amount, balance, upper_bound, &salt)?)
            }
        }
    }

    fn edge_into(path: &Path, node: NodeId) -> Option<(NodeId, NodeId)> {
        path.hops().find(|(_, to)| *to == node)
    }
}
