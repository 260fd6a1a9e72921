#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Nothing here is fatal. `MissingNode`, `TransitionInterrupted`, and
//! `ConfigurationEmpty` are recorded and logged while the sequence carries on;
//! they exist so callers and tests can see what degraded.

use thiserror::Error;

use crate::node::NodeId;
use crate::transition::InterruptReason;

/// Errors raised by the reveal core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    /// A stage referenced a node the scene does not provide.
    #[error("node `{node}` is not present in the scene; step skipped")]
    MissingNode { node: NodeId },

    /// A transition settled without finishing.
    #[error("transition on `{node}` was interrupted ({reason})")]
    TransitionInterrupted {
        node: NodeId,
        reason: InterruptReason,
    },

    /// A readiness detector was given nothing to watch.
    #[error("no node ids were requested; readiness detection disabled")]
    ConfigurationEmpty,

    /// A sequencer was started twice.
    #[error("timeline run already started; runs are not restartable")]
    AlreadyStarted,

    /// A node name did not match any known id.
    #[error("unknown node name `{name}`")]
    UnknownNode { name: String },

    /// A transform string could not be parsed.
    #[error("invalid transform `{input}`")]
    InvalidTransform { input: String },
}
