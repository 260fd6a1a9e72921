#![forbid(unsafe_code)]

//! Transition descriptions and their completion signals.
//!
//! A [`TransitionSpec`] says what a node should animate; the node decides how.
//! [`VisualNode::animate`](crate::node::VisualNode::animate) returns a
//! [`TransitionHandle`] that the node settles when the transition finishes or
//! is interrupted. Handles are polled, never awaited: the sequencer checks
//! [`TransitionHandle::is_settled`] once per frame.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::easing::Easing;
use crate::node::{Keyframe, NodeId};

/// What a node shows once a transition ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    /// Keep the last keyframe applied.
    #[default]
    Forwards,
    /// Revert to the pre-transition state.
    None,
}

/// Description of one timed property transition on one node.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    pub node: NodeId,
    /// Evenly spaced keyframes; the first is the start pose.
    pub keyframes: Vec<Keyframe>,
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
    pub fill: Fill,
    /// Make the node visible and interactive at the first keyframe before
    /// starting.
    pub reveal: bool,
}

impl TransitionSpec {
    #[must_use]
    pub fn new(node: NodeId, keyframes: Vec<Keyframe>, duration: Duration) -> Self {
        Self {
            node,
            keyframes,
            duration,
            easing: Easing::Linear,
            delay: Duration::ZERO,
            fill: Fill::Forwards,
            reveal: false,
        }
    }

    /// Two-keyframe transition from `from` to `to`.
    #[must_use]
    pub fn between(node: NodeId, from: Keyframe, to: Keyframe, duration: Duration) -> Self {
        Self::new(node, vec![from, to], duration)
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Show the node at its start pose before animating.
    #[must_use]
    pub fn revealing(mut self) -> Self {
        self.reveal = true;
        self
    }

    /// First keyframe, if any.
    #[must_use]
    pub fn start_frame(&self) -> Option<Keyframe> {
        self.keyframes.first().copied()
    }
}

/// Why a transition stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    /// Another transition on the same node replaced it.
    Superseded,
    /// The node cancelled it.
    Cancelled,
    /// The node was removed from its scene mid-flight.
    Detached,
}

impl fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Superseded => "superseded",
            Self::Cancelled => "cancelled",
            Self::Detached => "detached",
        })
    }
}

/// Lifecycle of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    /// Created; waiting for its delay to elapse.
    Pending,
    /// Animating.
    Running,
    /// Reached its last keyframe.
    Finished,
    /// Stopped early.
    Interrupted(InterruptReason),
}

impl TransitionStatus {
    /// Whether the transition will make no further progress.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Finished | Self::Interrupted(_))
    }
}

/// Completion signal shared between a node and whoever started the
/// transition.
///
/// Settling is sticky: once `Finished` or `Interrupted`, later updates are
/// ignored.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    status: Rc<Cell<TransitionStatus>>,
}

impl TransitionHandle {
    /// A new, pending handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Rc::new(Cell::new(TransitionStatus::Pending)),
        }
    }

    /// A handle that is already settled as `status`.
    #[must_use]
    pub fn settled(status: TransitionStatus) -> Self {
        let handle = Self::new();
        handle.set(status);
        handle
    }

    #[must_use]
    pub fn status(&self) -> TransitionStatus {
        self.status.get()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    /// Update the status. No-op once settled.
    pub fn set(&self, status: TransitionStatus) {
        if !self.is_settled() {
            self.status.set(status);
        }
    }

    pub fn finish(&self) {
        self.set(TransitionStatus::Finished);
    }

    pub fn interrupt(&self, reason: InterruptReason) {
        self.set(TransitionStatus::Interrupted(reason));
    }
}

impl Default for TransitionHandle {
    fn default() -> Self {
        Self::new()
    }
}
