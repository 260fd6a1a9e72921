#![forbid(unsafe_code)]

//! Timeline sequencer: run an ordered list of stages, one after another.
//!
//! A [`Sequencer`] is one timeline run. It owns the resolved node mapping and
//! a fixed list of [`Stage`]s, and is driven cooperatively: the owner calls
//! [`pump`](Sequencer::pump) every frame and forwards fired timers to
//! [`on_timer`](Sequencer::on_timer).
//!
//! # Invariants
//!
//! 1. Stages run in list order. A stage starts only after every transition of
//!    the previous stage has settled (finished or interrupted).
//! 2. Failures never propagate. An interrupted transition or a missing node
//!    is recorded in [`faults`](Sequencer::faults) and the run continues.
//! 3. A run starts at most once; a second `start` is rejected.
//! 4. Immediate stages (`Mutate`) settle synchronously, so several may run in
//!    one pump.

use std::time::Duration;

use crate::error::RevealError;
use crate::node::{Mutation, NodeId, NodeRef};
use crate::registry::SceneNodes;
use crate::timer::{TimerId, TimerService};
use crate::transition::{TransitionHandle, TransitionSpec, TransitionStatus};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One step of a timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// A single transition.
    Transition(TransitionSpec),
    /// Transitions started together; settled when all have settled.
    Parallel(Vec<TransitionSpec>),
    /// Wait a fixed time.
    Delay(Duration),
    /// Apply immediate mutations, in order.
    Mutate(Vec<(NodeId, Mutation)>),
}

impl Stage {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transition(_) => "transition",
            Self::Parallel(_) => "parallel",
            Self::Delay(_) => "delay",
            Self::Mutate(_) => "mutate",
        }
    }
}

/// Playback state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Built but not started.
    Idle,
    /// Executing stages.
    Running,
    /// Every stage has settled.
    Finished,
}

/// What the current stage is waiting on.
#[derive(Debug)]
enum InFlight {
    Transitions(Vec<(NodeId, TransitionHandle)>),
    Delay(TimerId),
    /// The delay timer fired (or was never needed).
    Elapsed,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// One run over a fixed stage list.
pub struct Sequencer {
    label: &'static str,
    nodes: SceneNodes,
    stages: Vec<Stage>,
    /// Index of the stage in flight (or next to start).
    cursor: usize,
    in_flight: Option<InFlight>,
    state: RunState,
    faults: Vec<RevealError>,
    stage_starts: Vec<Option<Duration>>,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("label", &self.label)
            .field("stage_count", &self.stages.len())
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("faults", &self.faults.len())
            .finish()
    }
}

impl Sequencer {
    /// Build a run. `label` tags log lines so concurrent runs are
    /// distinguishable.
    #[must_use]
    pub fn new(label: &'static str, nodes: SceneNodes, stages: Vec<Stage>) -> Self {
        let stage_count = stages.len();
        Self {
            label,
            nodes,
            stages,
            cursor: 0,
            in_flight: None,
            state: RunState::Idle,
            faults: Vec::new(),
            stage_starts: vec![None; stage_count],
        }
    }

    /// Begin the run and execute as far as possible.
    pub fn start(&mut self, timers: &mut dyn TimerService) -> Result<(), RevealError> {
        if self.state != RunState::Idle {
            return Err(RevealError::AlreadyStarted);
        }
        self.state = RunState::Running;
        tracing::debug!(
            target: "surprise.timeline",
            run = self.label,
            stages = self.stages.len(),
            "timeline run started"
        );
        self.pump(timers);
        Ok(())
    }

    /// Advance past every settled stage, starting the next ones.
    pub fn pump(&mut self, timers: &mut dyn TimerService) {
        if self.state != RunState::Running {
            return;
        }
        loop {
            if let Some(in_flight) = &self.in_flight {
                if !self.is_settled(in_flight) {
                    return;
                }
                self.settle_current();
                self.cursor += 1;
            }

            if self.cursor >= self.stages.len() {
                self.state = RunState::Finished;
                tracing::debug!(
                    target: "surprise.timeline",
                    run = self.label,
                    faults = self.faults.len(),
                    "timeline run finished"
                );
                return;
            }

            self.begin_stage(timers);
        }
    }

    /// Deliver a fired timer. Returns `true` if it belonged to this run.
    pub fn on_timer(&mut self, id: TimerId, timers: &mut dyn TimerService) -> bool {
        match self.in_flight {
            Some(InFlight::Delay(pending)) if pending == id => {
                self.in_flight = Some(InFlight::Elapsed);
                self.pump(timers);
                true
            }
            _ => false,
        }
    }

    fn is_settled(&self, in_flight: &InFlight) -> bool {
        match in_flight {
            InFlight::Transitions(handles) => handles.iter().all(|(_, h)| h.is_settled()),
            InFlight::Delay(_) => false,
            InFlight::Elapsed => true,
        }
    }

    /// Record faults for the stage that just settled.
    fn settle_current(&mut self) {
        if let Some(InFlight::Transitions(handles)) = self.in_flight.take() {
            for (node, handle) in handles {
                if let TransitionStatus::Interrupted(reason) = handle.status() {
                    let fault = RevealError::TransitionInterrupted { node, reason };
                    tracing::warn!(
                        target: "surprise.timeline",
                        run = self.label,
                        stage = self.cursor,
                        error = %fault,
                        "transition did not finish; continuing"
                    );
                    self.faults.push(fault);
                }
            }
        }
        tracing::debug!(
            target: "surprise.timeline",
            run = self.label,
            stage = self.cursor,
            at_ms = ?self.stage_starts[self.cursor].map(|d| d.as_millis()),
            "stage settled"
        );
    }

    fn begin_stage(&mut self, timers: &mut dyn TimerService) {
        let index = self.cursor;
        let stage = self.stages[index].clone();
        let _span = tracing::debug_span!(
            "timeline.stage",
            run = self.label,
            index,
            kind = stage.kind()
        )
        .entered();

        self.stage_starts[index] = Some(timers.now());
        let in_flight = match stage {
            Stage::Transition(spec) => {
                InFlight::Transitions(self.start_transitions(std::slice::from_ref(&spec)))
            }
            Stage::Parallel(specs) => InFlight::Transitions(self.start_transitions(&specs)),
            Stage::Delay(duration) => InFlight::Delay(timers.schedule(duration)),
            Stage::Mutate(mutations) => {
                for (id, mutation) in &mutations {
                    if let Some(node) = self.node(*id) {
                        mutation.apply(node.as_ref());
                        tracing::trace!(
                            target: "surprise.timeline",
                            node = %id,
                            mutation = mutation.kind(),
                            "mutation applied"
                        );
                    }
                }
                InFlight::Elapsed
            }
        };
        self.in_flight = Some(in_flight);
    }

    fn start_transitions(&mut self, specs: &[TransitionSpec]) -> Vec<(NodeId, TransitionHandle)> {
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            let Some(node) = self.node(spec.node) else {
                continue;
            };
            if spec.reveal
                && let Some(start) = spec.start_frame()
            {
                Mutation::Show(start).apply(node.as_ref());
            }
            tracing::trace!(
                target: "surprise.timeline",
                node = %spec.node,
                duration_ms = spec.duration.as_millis() as u64,
                delay_ms = spec.delay.as_millis() as u64,
                easing = spec.easing.name(),
                "transition started"
            );
            handles.push((spec.node, node.animate(spec)));
        }
        handles
    }

    /// Resolve a node, recording a fault when it is absent.
    fn node(&mut self, id: NodeId) -> Option<NodeRef> {
        let node = self.nodes.get(id).cloned();
        if node.is_none() {
            let fault = RevealError::MissingNode { node: id };
            tracing::debug!(
                target: "surprise.timeline",
                run = self.label,
                stage = self.cursor,
                error = %fault,
                "skipping step"
            );
            self.faults.push(fault);
        }
        node
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Index of the stage in flight; equals the stage count once finished.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Non-fatal problems encountered so far.
    #[must_use]
    pub fn faults(&self) -> &[RevealError] {
        &self.faults
    }

    /// Timer-clock time at which stage `index` started, if it has.
    #[must_use]
    pub fn stage_started_at(&self, index: usize) -> Option<Duration> {
        self.stage_starts.get(index).copied().flatten()
    }

    #[must_use]
    pub fn nodes(&self) -> &SceneNodes {
        &self.nodes
    }
}
