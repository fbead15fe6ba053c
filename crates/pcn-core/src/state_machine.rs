use std::fmt;

use crate::error::CoreError;

/// The lifecycle states of one HTLC payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HtlcState {
    /// Forward locks are being applied hop by hop.
    Locking,
    /// The preimage is travelling back from the receiver toward the sender.
    Revealing,
    /// The reveal chain reached the sender. Final state.
    Settled,
    /// Some hop refused to reveal; every lock and credit was undone. Final state.
    RolledBack,
}

impl HtlcState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Settled | Self::RolledBack)
    }
}

impl fmt::Display for HtlcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locking => write!(f, "Locking"),
            Self::Revealing => write!(f, "Revealing"),
            Self::Settled => write!(f, "Settled"),
            Self::RolledBack => write!(f, "RolledBack"),
        }
    }
}

/// Events that trigger HTLC state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtlcEvent {
    /// Every hop of the path has been debited.
    LocksApplied,
    /// The preimage reached the sender.
    RevealCompleted,
    /// A hop did not know the preimage or refused to pass it on.
    RevealRefused,
}

impl fmt::Display for HtlcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocksApplied => write!(f, "LocksApplied"),
            Self::RevealCompleted => write!(f, "RevealCompleted"),
            Self::RevealRefused => write!(f, "RevealRefused"),
        }
    }
}

/// Valid transitions:
/// - Locking → Revealing (LocksApplied)
/// - Revealing → Settled (RevealCompleted)
/// - Revealing → RolledBack (RevealRefused)
///
/// Nothing leaves a final state, which is what makes a rollback single-shot.
pub struct HtlcStateMachine;

impl HtlcStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(current: HtlcState, event: HtlcEvent) -> Result<HtlcState, CoreError> {
        let new_state = match (current, event) {
            (HtlcState::Locking, HtlcEvent::LocksApplied) => HtlcState::Revealing,
            (HtlcState::Revealing, HtlcEvent::RevealCompleted) => HtlcState::Settled,
            (HtlcState::Revealing, HtlcEvent::RevealRefused) => HtlcState::RolledBack,
            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event,
                });
            }
        };

        tracing::trace!(from = %current, to = %new_state, event = %event, "htlc state transition");

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: HtlcState, event: HtlcEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
