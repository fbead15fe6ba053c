use crate::state_machine::{HtlcEvent, HtlcState};
use crate::types::NodeId;

/// Core errors: graph construction, path shape, state transitions, config I/O.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} on {event}")]
    InvalidStateTransition { from: HtlcState, event: HtlcEvent },

    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid channel {from} -> {to}: {reason}")]
    InvalidChannel {
        from: NodeId,
        to: NodeId,
        reason: String,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
