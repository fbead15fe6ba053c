use std::collections::BTreeSet;

use pcn_core::{
    Amount, ChannelGraph, Edge, HtlcEvent, HtlcState, HtlcStateMachine, NodeId, Path,
    SettlementConfig,
};
use pcn_crypto::{HashLock, Preimage};
use rand::Rng;

use crate::error::SettlementError;
use crate::types::{AttemptId, SettlementOutcome, SettlementReceipt};

/// One payment attempt along a fixed path.
///
/// Every balance change is recorded in one of two ledgers so a rollback can
/// undo exactly what was applied. Both ledgers are drained by the rollback.
#[derive(Debug)]
pub struct PaymentAttempt {
    id: AttemptId,
    path: Path,
    amount: Amount,
    hash_lock: HashLock,
    /// The receiver's copy of the secret.
    preimage: Preimage,
    state: HtlcState,
    /// `(u, v)` debited during locking, in path order.
    forward_locks: Vec<Edge>,
    /// `(downstream, upstream)` credited during revealing, receiver first.
    reverse_credits: Vec<Edge>,
    knows_preimage: BTreeSet<NodeId>,
    uncooperative: Option<NodeId>,
}

impl PaymentAttempt {
    /// Start an attempt with a freshly drawn preimage.
    pub fn new<R: Rng + ?Sized>(path: Path, amount: Amount, rng: &mut R) -> Result<Self, SettlementError> {
        let preimage = Preimage::generate(rng);
        let hash_lock = preimage.hash_lock();
        Self::with_preimage(path, amount, hash_lock, preimage)
    }

    /// Start an attempt committed to `hash_lock`, with `preimage` handed to
    /// the receiver. The receiver can only reveal if the two match.
    pub fn with_preimage(
        path: Path,
        amount: Amount,
        hash_lock: HashLock,
        preimage: Preimage,
    ) -> Result<Self, SettlementError> {
        if amount <= 0 {
            return Err(SettlementError::InvalidAmount(amount));
        }
        Ok(Self {
            id: AttemptId::new(),
            path,
            amount,
            hash_lock,
            preimage,
            state: HtlcState::Locking,
            forward_locks: Vec::new(),
            reverse_credits: Vec::new(),
            knows_preimage: BTreeSet::new(),
            uncooperative: None,
        })
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn state(&self) -> HtlcState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn hash_lock(&self) -> HashLock {
        self.hash_lock
    }

    pub fn forward_locks(&self) -> &[Edge] {
        &self.forward_locks
    }

    pub fn reverse_credits(&self) -> &[Edge] {
        &self.reverse_credits
    }

    /// Whether `node` has learned the preimage during this attempt.
    pub fn knows_preimage(&self, node: NodeId) -> bool {
        self.knows_preimage.contains(&node)
    }

    /// The node that broke the reveal chain, once rolled back.
    pub fn uncooperative(&self) -> Option<NodeId> {
        self.uncooperative
    }

    /// The final outcome, or `None` while the attempt is still running.
    pub fn outcome(&self) -> Option<SettlementOutcome> {
        match self.state {
            HtlcState::Settled => Some(SettlementOutcome::Settled),
            HtlcState::RolledBack => Some(match self.uncooperative {
                Some(uncooperative) => SettlementOutcome::RolledBack { uncooperative },
                None => SettlementOutcome::Aborted,
            }),
            _ => None,
        }
    }

    fn advance(&mut self, event: HtlcEvent) -> Result<(), SettlementError> {
        self.state = HtlcStateMachine::transition(self.state, event).map_err(|source| {
            SettlementError::InvalidStateTransition {
                attempt: self.id,
                source,
            }
        })?;
        Ok(())
    }

    fn ensure(&self, event: HtlcEvent) -> Result<(), SettlementError> {
        if HtlcStateMachine::can_transition(self.state, event) {
            return Ok(());
        }
        Err(SettlementError::InvalidStateTransition {
            attempt: self.id,
            source: pcn_core::CoreError::InvalidStateTransition {
                from: self.state,
                event,
            },
        })
    }

    /// Debit every hop by the amount, sender to receiver.
    ///
    /// Sufficiency is the validator's job and is not re-checked here.
    pub fn lock(&mut self, graph: &mut ChannelGraph) -> Result<(), SettlementError> {
        self.ensure(HtlcEvent::LocksApplied)?;
        graph
            .validate_path(&self.path)
            .map_err(SettlementError::MalformedPath)?;

        for (from, to) in self.path.hops() {
            graph.debit(from, to, self.amount);
            self.forward_locks.push((from, to));
            tracing::debug!(attempt = %self.id, %from, %to, amount = self.amount, "forward lock");
        }

        self.advance(HtlcEvent::LocksApplied)
    }

    /// Pass the preimage from the receiver back toward the sender.
    ///
    /// At each step the downstream node must know the preimage and be honest;
    /// the upstream node then learns it and the reverse channel is credited.
    /// The first step that fails rolls the whole attempt back.
    pub fn reveal(&mut self, graph: &mut ChannelGraph) -> Result<SettlementOutcome, SettlementError> {
        self.ensure(HtlcEvent::RevealCompleted)?;

        let receiver = self.path.receiver();
        if self.hash_lock.verify(&self.preimage) {
            self.knows_preimage.insert(receiver);
        }

        let hops: Vec<Edge> = self.path.hops().rev().collect();
        for (upstream, downstream) in hops {
            if !self.knows_preimage.contains(&downstream) || !graph.is_honest(downstream) {
                tracing::debug!(
                    attempt = %self.id,
                    node = %downstream,
                    "reveal refused"
                );
                self.uncooperative = Some(downstream);
                self.rollback(graph)?;
                return Ok(SettlementOutcome::RolledBack {
                    uncooperative: downstream,
                });
            }

            self.knows_preimage.insert(upstream);
            graph.credit(downstream, upstream, self.amount);
            self.reverse_credits.push((downstream, upstream));
            tracing::debug!(
                attempt = %self.id,
                from = %downstream,
                to = %upstream,
                amount = self.amount,
                "reverse credit"
            );
        }

        self.advance(HtlcEvent::RevealCompleted)?;
        Ok(SettlementOutcome::Settled)
    }

    /// Undo every reverse credit and forward lock applied so far.
    ///
    /// Only valid while revealing. Once rolled back the attempt is final, so
    /// a second rollback is an error and can never re-apply the ledgers.
    pub fn rollback(&mut self, graph: &mut ChannelGraph) -> Result<(), SettlementError> {
        self.ensure(HtlcEvent::RevealRefused)?;

        for (from, to) in self.reverse_credits.drain(..).rev() {
            graph.debit(from, to, self.amount);
        }
        for (from, to) in self.forward_locks.drain(..).rev() {
            graph.credit(from, to, self.amount);
        }

        self.advance(HtlcEvent::RevealRefused)
    }
}

/// Configuration for the HtlcEngine.
#[derive(Debug, Clone)]
pub struct HtlcEngineConfig {
    /// Feed outcomes back into the sender's reputation table.
    pub track_reputation: bool,
}

impl Default for HtlcEngineConfig {
    fn default() -> Self {
        Self {
            track_reputation: true,
        }
    }
}

impl From<&SettlementConfig> for HtlcEngineConfig {
    fn from(config: &SettlementConfig) -> Self {
        Self {
            track_reputation: config.track_reputation,
        }
    }
}

/// Drives a [`PaymentAttempt`] through lock and reveal and records the
/// result in the sender's reputation table.
#[derive(Debug, Clone, Default)]
pub struct HtlcEngine {
    config: HtlcEngineConfig,
}

impl HtlcEngine {
    pub fn new(config: HtlcEngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &HtlcEngineConfig {
        &self.config
    }

    /// Settle `amount` along `path`.
    ///
    /// Refused reveals come back as an `Ok` receipt with a rolled-back
    /// outcome; only a malformed path or a non-positive amount is an error.
    pub fn settle<R: Rng + ?Sized>(
        &self,
        graph: &mut ChannelGraph,
        path: &Path,
        amount: Amount,
        rng: &mut R,
    ) -> Result<SettlementReceipt, SettlementError> {
        let mut attempt = PaymentAttempt::new(path.clone(), amount, rng)?;
        self.run(graph, &mut attempt)
    }

    /// Run a prepared attempt to completion.
    pub fn run(
        &self,
        graph: &mut ChannelGraph,
        attempt: &mut PaymentAttempt,
    ) -> Result<SettlementReceipt, SettlementError> {
        attempt.lock(graph)?;
        let outcome = attempt.reveal(graph)?;

        if self.config.track_reputation {
            self.record_outcome(graph, attempt.path(), outcome);
        }

        match outcome {
            SettlementOutcome::Settled => tracing::info!(
                attempt = %attempt.id(),
                hash_lock = %attempt.hash_lock(),
                path = %attempt.path(),
                amount = attempt.amount(),
                "payment settled"
            ),
            SettlementOutcome::RolledBack { uncooperative } => tracing::info!(
                attempt = %attempt.id(),
                hash_lock = %attempt.hash_lock(),
                path = %attempt.path(),
                amount = attempt.amount(),
                %uncooperative,
                "payment rolled back"
            ),
            SettlementOutcome::Aborted => tracing::info!(
                attempt = %attempt.id(),
                hash_lock = %attempt.hash_lock(),
                "payment aborted"
            ),
        }

        Ok(SettlementReceipt {
            attempt_id: attempt.id(),
            hash_lock: attempt.hash_lock(),
            path: attempt.path().clone(),
            amount: attempt.amount(),
            outcome,
        })
    }

    fn record_outcome(&self, graph: &mut ChannelGraph, path: &Path, outcome: SettlementOutcome) {
        let Some(table) = graph.reputation_mut(path.sender()) else {
            return;
        };
        match outcome {
            SettlementOutcome::Settled => {
                for node in path.downstream() {
                    table.record_success(*node);
                }
            }
            SettlementOutcome::RolledBack { uncooperative } => {
                table.record_failure(uncooperative);
            }
            SettlementOutcome::Aborted => {}
        }
    }
}
