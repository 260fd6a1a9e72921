#![forbid(unsafe_code)]

//! Hold-trigger gesture: a press held for a threshold fires a one-time swap
//! effect.
//!
//! # State Machine
//!
//! ```text
//!          start                    timer fires
//! Idle ───────────► Armed{timer} ───────────────► Fired
//!  ▲                  │                             │
//!  └──── end ─────────┘          start (re-arm) ◄───┘
//! ```
//!
//! `start` while `Armed` is ignored, so auto-repeat never restarts the clock.
//! The swap effect plays on the first entry to `Fired` only; later holds
//! re-enter `Fired` without replaying it.

use std::time::Duration;

use crate::input::ActivateSignal;
use crate::node::NodeId;
use crate::registry::{NodeRegistry, SceneNodes};
use crate::script::hold_swap_stages;
use crate::sequencer::Sequencer;
use crate::timer::{TimerId, TimerService};

/// Default press length required to fire.
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(3000);

/// Nodes the swap effect touches.
const SWAP_NODES: [NodeId; 6] = [
    NodeId::HeadingWow,
    NodeId::Flame1,
    NodeId::Flame2,
    NodeId::Flame3,
    NodeId::Flame4,
    NodeId::Flame5,
];

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    /// A press is in progress; `timer` fires when the threshold is reached.
    Armed { timer: TimerId },
    Fired,
}

/// Long-press detector that owns the swap effect run.
#[derive(Debug)]
pub struct HoldTrigger {
    threshold: Duration,
    replacement_text: String,
    state: HoldState,
    effect: Option<Sequencer>,
    fire_count: u32,
    detached: bool,
}

impl HoldTrigger {
    #[must_use]
    pub fn new(threshold: Duration, replacement_text: impl Into<String>) -> Self {
        Self {
            threshold,
            replacement_text: replacement_text.into(),
            state: HoldState::Idle,
            effect: None,
            fire_count: 0,
            detached: false,
        }
    }

    /// Route an activation signal.
    pub fn signal(&mut self, signal: ActivateSignal, timers: &mut dyn TimerService) {
        match signal {
            ActivateSignal::Start => self.activate_start(timers),
            ActivateSignal::End => self.activate_end(timers),
        }
    }

    /// Press began (or repeated).
    pub fn activate_start(&mut self, timers: &mut dyn TimerService) {
        if self.detached {
            return;
        }
        match self.state {
            HoldState::Armed { .. } => {}
            HoldState::Idle | HoldState::Fired => {
                let timer = timers.schedule(self.threshold);
                self.state = HoldState::Armed { timer };
                tracing::debug!(
                    target: "surprise.hold",
                    timer = timer.get(),
                    threshold_ms = self.threshold.as_millis() as u64,
                    "hold armed"
                );
            }
        }
    }

    /// Press released. Cancels an armed hold; otherwise a no-op.
    pub fn activate_end(&mut self, timers: &mut dyn TimerService) {
        if let HoldState::Armed { timer } = self.state {
            timers.cancel(timer);
            self.state = HoldState::Idle;
            tracing::debug!(target: "surprise.hold", timer = timer.get(), "hold released early");
        }
    }

    /// Deliver a fired timer. Returns `true` if it belonged to this detector
    /// or its effect run.
    ///
    /// `registry` is consulted only when the swap effect is first built, so
    /// the effect sees the scene as it is at fire time.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        timers: &mut dyn TimerService,
        registry: &dyn NodeRegistry,
    ) -> bool {
        if let Some(effect) = self.effect.as_mut()
            && effect.on_timer(id, timers)
        {
            return true;
        }

        match self.state {
            HoldState::Armed { timer } if timer == id => {
                self.state = HoldState::Fired;
                self.fire_count += 1;
                tracing::info!(
                    target: "surprise.hold",
                    fires = self.fire_count,
                    "hold completed"
                );
                if self.effect.is_none() {
                    self.play_swap(timers, registry);
                }
                true
            }
            _ => false,
        }
    }

    fn play_swap(&mut self, timers: &mut dyn TimerService, registry: &dyn NodeRegistry) {
        let nodes = SceneNodes::resolve_present(registry, &SWAP_NODES);
        let mut effect = Sequencer::new(
            "hold-swap",
            nodes,
            hold_swap_stages(&self.replacement_text),
        );
        if let Err(err) = effect.start(timers) {
            tracing::warn!(target: "surprise.hold", error = %err, "swap effect did not start");
        }
        self.effect = Some(effect);
    }

    /// Advance the swap effect, if one is playing.
    pub fn pump(&mut self, timers: &mut dyn TimerService) {
        if let Some(effect) = self.effect.as_mut() {
            effect.pump(timers);
        }
    }

    /// Cancel any pending hold and ignore future signals. A swap effect that
    /// is already playing is left to finish.
    pub fn teardown(&mut self, timers: &mut dyn TimerService) {
        if let HoldState::Armed { timer } = self.state {
            timers.cancel(timer);
            self.state = HoldState::Idle;
        }
        if !self.detached {
            self.detached = true;
            tracing::debug!(target: "surprise.hold", "hold detector detached");
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> HoldState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, HoldState::Armed { .. })
    }

    /// Number of holds that reached the threshold.
    #[must_use]
    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    /// The swap effect run, once the first hold has fired.
    #[must_use]
    pub fn effect(&self) -> Option<&Sequencer> {
        self.effect.as_ref()
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    #[must_use]
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

impl Default for HoldTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_THRESHOLD, crate::config::DEFAULT_REPLACEMENT_TEXT)
    }
}
