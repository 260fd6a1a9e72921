#![forbid(unsafe_code)]

//! The owning context: readiness, the reveal run, and the hold detector
//! driven from one frame tick.
//!
//! ```rust,ignore
//! let mut director = RevealDirector::new(RevealConfig::default());
//! director.attach(&mut bus, &scene);
//! loop {
//!     scene.advance(dt);
//!     director.tick(dt, &scene, &mut bus);
//! }
//! ```
//!
//! A tick does four things, in order: drain input into the hold detector,
//! advance timers and route the ones that fired, poll readiness (starting the
//! reveal on the first hit), then pump the reveal and the swap effect.

use std::time::Duration;

use crate::config::RevealConfig;
use crate::hold::HoldTrigger;
use crate::input::{InputBus, ListenerId, TriggerBinding};
use crate::readiness::ReadinessDetector;
use crate::registry::{NodeRegistry, SceneNodes};
use crate::script::{reveal_duration, reveal_stages};
use crate::sequencer::Sequencer;
use crate::timer::{TimerQueue, TimerService};

/// Lifecycle of the director itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorPhase {
    /// Built, not yet attached to a scene.
    Detached,
    Attached,
    /// Torn down. A reveal already playing keeps going.
    TornDown,
}

/// Drives one reveal and one hold detector over a scene.
#[derive(Debug)]
pub struct RevealDirector {
    config: RevealConfig,
    binding: TriggerBinding,
    timers: TimerQueue,
    readiness: ReadinessDetector,
    timeline: Option<Sequencer>,
    hold: HoldTrigger,
    listener: Option<ListenerId>,
    phase: DirectorPhase,
}

impl RevealDirector {
    /// A hold threshold shorter than the reveal run is raised to
    /// [`reveal_duration`], so a completed hold always lands after the
    /// flames are shown.
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        let minimum = reveal_duration();
        let threshold = if config.hold_threshold < minimum {
            tracing::warn!(
                target: "surprise.director",
                threshold_ms = config.hold_threshold.as_millis() as u64,
                minimum_ms = minimum.as_millis() as u64,
                "hold threshold shorter than the reveal; clamping"
            );
            minimum
        } else {
            config.hold_threshold
        };
        Self {
            binding: TriggerBinding::new(config.trigger),
            timers: TimerQueue::new(),
            readiness: ReadinessDetector::new(&config.required),
            timeline: None,
            hold: HoldTrigger::new(threshold, config.replacement_text.clone()),
            listener: None,
            phase: DirectorPhase::Detached,
            config,
        }
    }

    /// Subscribe to input and check readiness against the scene as it is
    /// now. Calling it again is a no-op.
    pub fn attach(&mut self, bus: &mut InputBus, registry: &dyn NodeRegistry) {
        if self.phase != DirectorPhase::Detached {
            return;
        }
        self.listener = Some(bus.subscribe());
        self.phase = DirectorPhase::Attached;
        tracing::debug!(
            target: "surprise.director",
            required = self.config.required.len(),
            trigger = %self.config.trigger,
            "director attached"
        );
        self.poll_readiness(registry);
    }

    /// Run one frame. `registry` must already reflect `dt` worth of progress.
    pub fn tick(&mut self, dt: Duration, registry: &dyn NodeRegistry, bus: &mut InputBus) {
        if let Some(listener) = self.listener {
            for event in bus.drain(listener) {
                if let Some(signal) = self.binding.signal(&event) {
                    self.hold.signal(signal, &mut self.timers);
                }
            }
        }

        for id in self.timers.advance(dt) {
            if self.hold.on_timer(id, &mut self.timers, registry) {
                continue;
            }
            if let Some(timeline) = self.timeline.as_mut() {
                timeline.on_timer(id, &mut self.timers);
            }
        }

        if self.phase == DirectorPhase::Attached {
            self.poll_readiness(registry);
        }

        if let Some(timeline) = self.timeline.as_mut() {
            timeline.pump(&mut self.timers);
        }
        self.hold.pump(&mut self.timers);
    }

    fn poll_readiness(&mut self, registry: &dyn NodeRegistry) {
        if let Some(nodes) = self.readiness.poll(registry) {
            self.start_reveal(nodes);
        }
    }

    fn start_reveal(&mut self, nodes: SceneNodes) {
        if self.timeline.is_some() {
            return;
        }
        tracing::info!(
            target: "surprise.director",
            at_ms = self.timers.now().as_millis() as u64,
            "scene ready; starting reveal"
        );
        let mut timeline = Sequencer::new("reveal", nodes, reveal_stages());
        if let Err(err) = timeline.start(&mut self.timers) {
            tracing::warn!(target: "surprise.director", error = %err, "reveal did not start");
        }
        self.timeline = Some(timeline);
    }

    /// Stop observing the scene and the input. Idempotent.
    pub fn teardown(&mut self, bus: &mut InputBus) {
        if self.phase == DirectorPhase::TornDown {
            return;
        }
        self.readiness.cancel();
        self.hold.teardown(&mut self.timers);
        if let Some(listener) = self.listener.take() {
            bus.unsubscribe(listener);
        }
        self.phase = DirectorPhase::TornDown;
        tracing::debug!(
            target: "surprise.director",
            reveal_running = self.timeline.as_ref().is_some_and(|t| !t.is_finished()),
            "director torn down"
        );
    }

    #[must_use]
    pub fn phase(&self) -> DirectorPhase {
        self.phase
    }

    /// The reveal run, once readiness has fired.
    #[must_use]
    pub fn timeline(&self) -> Option<&Sequencer> {
        self.timeline.as_ref()
    }

    #[must_use]
    pub fn hold(&self) -> &HoldTrigger {
        &self.hold
    }

    #[must_use]
    pub fn readiness(&self) -> &ReadinessDetector {
        &self.readiness
    }

    #[must_use]
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Director clock; advances only through [`tick`](Self::tick).
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    #[must_use]
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Whether anything is still waiting on a future tick.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let timeline_done = self.timeline.as_ref().is_none_or(Sequencer::is_finished);
        let effect_done = self.hold.effect().is_none_or(Sequencer::is_finished);
        timeline_done && effect_done && !self.hold.is_armed()
    }
}
