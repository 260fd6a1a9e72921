#![forbid(unsafe_code)]

//! Core: scene readiness, the reveal timeline, and the hold trigger.
//!
//! # Role
//! `surprise-core` plays a fixed, staged reveal over a set of externally
//! supplied visual nodes once they all exist, then listens for a long press
//! that swaps the heading text.
//!
//! # Primary responsibilities
//! - **ReadinessDetector**: single-fire wait until every named node resolves.
//! - **Sequencer**: stage-by-stage driver that swallows per-node failures.
//! - **HoldTrigger**: `Idle → Armed → Fired` press detector with cancel on
//!   release.
//! - **RevealDirector**: owns the above and runs them from one frame tick.
//!
//! # How it fits together
//! Everything is single-threaded and tick-driven. The host owns the nodes
//! (behind [`NodeRegistry`] and [`VisualNode`]) and calls
//! [`RevealDirector::tick`] each frame. Time is virtual: it advances only by
//! the `dt` passed in, which keeps every run reproducible.
//! [`memory::MemoryScene`] is a complete in-memory host used by the tests and
//! the demo binary.

pub mod config;
pub mod director;
pub mod easing;
pub mod error;
pub mod hold;
pub mod input;
pub mod memory;
pub mod node;
pub mod readiness;
pub mod registry;
pub mod script;
pub mod sequencer;
pub mod timer;
pub mod transition;
pub mod tween;

#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::RevealConfig;
pub use director::{DirectorPhase, RevealDirector};
pub use easing::{CubicBezier, Easing};
pub use error::RevealError;
pub use hold::{HoldState, HoldTrigger};
pub use input::{ActivateSignal, InputBus, InputEvent, Key, KeyPhase, TriggerBinding};
pub use node::{Keyframe, Mutation, NodeId, NodeRef, NodeState, Transform, VisualNode};
pub use readiness::{ReadinessDetector, ReadinessState};
pub use registry::{NodeRegistry, SceneNodes};
pub use sequencer::{RunState, Sequencer, Stage};
pub use timer::{TimerId, TimerQueue, TimerService};
pub use transition::{InterruptReason, TransitionHandle, TransitionSpec, TransitionStatus};
