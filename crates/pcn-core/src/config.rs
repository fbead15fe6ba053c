//! Simulation configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;
use crate::types::{Amount, Score};

/// Full configuration for a PCN simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PcnConfig {
    /// Random topology settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Path discovery and validation settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// HTLC settlement settings.
    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Reputation gossip settings.
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Trial repetition settings.
    #[serde(default)]
    pub experiment: ExperimentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of participants.
    #[serde(default = "default_node_count")]
    pub node_count: u32,
    /// Number of bilateral channels (each yields two directed edges).
    #[serde(default = "default_channel_count")]
    pub channel_count: u32,
    /// Lowest initial balance per direction.
    #[serde(default = "default_min_channel_balance")]
    pub min_channel_balance: Amount,
    /// Highest initial balance per direction.
    #[serde(default = "default_max_channel_balance")]
    pub max_channel_balance: Amount,
}

/// How the path finder ranks candidate paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    /// Breadth-first search, fewest hops.
    #[default]
    Unweighted,
    /// Dijkstra over a per-hop cost.
    CapacityWeighted,
}

/// How the route validator checks that a hop can carry the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapacityCheckMode {
    /// Read the channel balance directly.
    #[default]
    Direct,
    /// Ask the balance comparison oracle; the balance is never revealed.
    Oracle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Path search strategy.
    #[serde(default)]
    pub strategy: PathStrategy,
    /// Per-hop cost used by the capacity-weighted strategy.
    #[serde(default = "default_hop_cost")]
    pub hop_cost: u64,
    /// Capacity check mode.
    #[serde(default)]
    pub capacity_check: CapacityCheckMode,
    /// How far above the true balance the oracle's range extends.
    #[serde(default = "default_oracle_headroom")]
    pub oracle_headroom: Amount,
    /// Maximum number of candidate paths evaluated per payment.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Reject paths through nodes the sender scores non-positively.
    #[serde(default = "default_true")]
    pub reputation_gate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Update the sender's reputation table after every attempt.
    #[serde(default = "default_true")]
    pub track_reputation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Whether the driver runs reputation gossip at all.
    #[serde(default = "default_true")]
    pub propagation_enabled: bool,
    /// Lower end of the per-node trust threshold draw.
    #[serde(default = "default_min_threshold")]
    pub min_threshold: Score,
    /// Upper end of the per-node trust threshold draw.
    #[serde(default = "default_max_threshold")]
    pub max_threshold: Score,
    /// Probability that gossip runs before a settlement.
    #[serde(default = "default_update_probability")]
    pub update_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Independent trials per malicious ratio.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Payments issued per trial.
    #[serde(default = "default_payments_per_trial")]
    pub payments_per_trial: u32,
    /// Payment amounts are drawn from `[1, max_send_amount]`.
    #[serde(default = "default_max_send_amount")]
    pub max_send_amount: Amount,
    /// Fractions of nodes marked dishonest, one sweep entry each.
    #[serde(default = "default_malicious_ratios")]
    pub malicious_ratios: Vec<f64>,
    /// Base RNG seed. Each trial derives its own seed from it.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_node_count() -> u32 {
    100
}
fn default_channel_count() -> u32 {
    400
}
fn default_min_channel_balance() -> Amount {
    1
}
fn default_max_channel_balance() -> Amount {
    1000
}
fn default_hop_cost() -> u64 {
    1
}
fn default_oracle_headroom() -> Amount {
    1000
}
fn default_max_attempts() -> u32 {
    10
}
fn default_true() -> bool {
    true
}
fn default_min_threshold() -> Score {
    0
}
fn default_max_threshold() -> Score {
    1
}
fn default_update_probability() -> f64 {
    0.9
}
fn default_trials() -> u32 {
    10
}
fn default_payments_per_trial() -> u32 {
    1000
}
fn default_max_send_amount() -> Amount {
    100
}
fn default_malicious_ratios() -> Vec<f64> {
    vec![0.0, 0.1, 0.2, 0.3]
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            channel_count: default_channel_count(),
            min_channel_balance: default_min_channel_balance(),
            max_channel_balance: default_max_channel_balance(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: PathStrategy::default(),
            hop_cost: default_hop_cost(),
            capacity_check: CapacityCheckMode::default(),
            oracle_headroom: default_oracle_headroom(),
            max_attempts: default_max_attempts(),
            reputation_gate: true,
        }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            track_reputation: true,
        }
    }
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            propagation_enabled: true,
            min_threshold: default_min_threshold(),
            max_threshold: default_max_threshold(),
            update_probability: default_update_probability(),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            payments_per_trial: default_payments_per_trial(),
            max_send_amount: default_max_send_amount(),
            malicious_ratios: default_malicious_ratios(),
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PcnConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PcnConfig = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let net = &self.network;
        if net.node_count < 2 {
            return Err(CoreError::InvalidConfig("node_count must be at least 2".into()));
        }
        let max_pairs = net.node_count as u64 * (net.node_count as u64 - 1) / 2;
        if net.channel_count as u64 > max_pairs {
            return Err(CoreError::InvalidConfig(format!(
                "channel_count {} exceeds the {} node pairs available",
                net.channel_count, max_pairs
            )));
        }
        if net.min_channel_balance < 0 || net.min_channel_balance > net.max_channel_balance {
            return Err(CoreError::InvalidConfig(
                "channel balance range must satisfy 0 <= min <= max".into(),
            ));
        }
        if self.routing.oracle_headroom < 1 {
            return Err(CoreError::InvalidConfig("oracle_headroom must be positive".into()));
        }
        if self.reputation.min_threshold > self.reputation.max_threshold {
            return Err(CoreError::InvalidConfig(
                "reputation threshold range is empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reputation.update_probability) {
            return Err(CoreError::InvalidConfig(
                "update_probability must be within [0, 1]".into(),
            ));
        }
        if self.experiment.max_send_amount < 1 {
            return Err(CoreError::InvalidConfig("max_send_amount must be positive".into()));
        }
        if self
            .experiment
            .malicious_ratios
            .iter()
            .any(|r| !(0.0..=1.0).contains(r))
        {
            return Err(CoreError::InvalidConfig(
                "malicious ratios must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
