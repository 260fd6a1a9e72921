//! Headless run: nodes arrive in batches, the reveal plays, and a scripted
//! press exercises the hold trigger.

use std::fmt;
use std::time::Duration;

use surprise_core::memory::MemoryScene;
use surprise_core::{
    HoldState, InputBus, InputEvent, NodeId, NodeState, RevealConfig, RevealDirector, RevealError,
};

use crate::error::{DemoError, Result};

/// Gap between node batches.
const BATCH_INTERVAL: Duration = Duration::from_millis(100);
/// Virtual time after which an unsettled run is an error.
const SETTLE_LIMIT: Duration = Duration::from_secs(60);

/// Resolved inputs for one run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: RevealConfig,
    pub frame_ms: u64,
    pub hold_at_ms: u64,
    pub hold_for_ms: u64,
    pub batches: usize,
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub elapsed: Duration,
    pub frames: u64,
    pub reveal_started: bool,
    pub reveal_faults: Vec<RevealError>,
    pub hold_state: HoldState,
    pub hold_fires: u32,
    pub nodes: Vec<(NodeId, NodeState)>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "settled after {} ms ({} frames)",
            self.elapsed.as_millis(),
            self.frames
        )?;
        writeln!(
            f,
            "reveal: {}",
            if self.reveal_started { "played" } else { "never started" }
        )?;
        for fault in &self.reveal_faults {
            writeln!(f, "  fault: {fault}")?;
        }
        writeln!(f, "hold: {:?}, fired {} time(s)", self.hold_state, self.hold_fires)?;
        for (id, state) in &self.nodes {
            writeln!(f, "{id:>14}  {state}")?;
        }
        Ok(())
    }
}

fn split_batches(count: usize) -> Vec<Vec<NodeId>> {
    let size = NodeId::ALL.len().div_ceil(count.max(1));
    NodeId::ALL.chunks(size).map(<[NodeId]>::to_vec).collect()
}

/// Play `scenario` to completion on a fresh in-memory scene.
pub fn run_scenario(scenario: &Scenario) -> Result<Report> {
    if scenario.frame_ms == 0 {
        return Err(DemoError::invalid("frame length must be non-zero"));
    }
    let frame = Duration::from_millis(scenario.frame_ms);
    let hold_at = Duration::from_millis(scenario.hold_at_ms);
    let release_at = hold_at + Duration::from_millis(scenario.hold_for_ms);
    let trigger = scenario.config.trigger;

    let scene = MemoryScene::new();
    let mut bus = InputBus::new();
    let mut director = RevealDirector::new(scenario.config.clone());
    let mut pending = split_batches(scenario.batches).into_iter();
    let mut next_batch_at = Duration::ZERO;
    let mut pressed = false;
    let mut released = false;

    tracing::info!(
        target: "surprise.demo",
        frame_ms = scenario.frame_ms,
        batches = scenario.batches,
        hold_at_ms = scenario.hold_at_ms,
        hold_for_ms = scenario.hold_for_ms,
        "simulation starting"
    );

    director.attach(&mut bus, &scene);
    let mut frames = 0u64;
    loop {
        let now = scene.now();
        if now >= next_batch_at
            && let Some(batch) = pending.next()
        {
            scene.insert_batch(&batch);
            tracing::debug!(
                target: "surprise.demo",
                at_ms = now.as_millis() as u64,
                nodes = batch.len(),
                "batch arrived"
            );
            next_batch_at = now + BATCH_INTERVAL;
        }
        if !pressed && now >= hold_at {
            bus.publish(InputEvent::key_down(trigger));
            pressed = true;
        }
        if pressed && !released && now >= release_at {
            bus.publish(InputEvent::key_up(trigger));
            released = true;
        }

        scene.advance(frame);
        director.tick(frame, &scene, &mut bus);
        frames += 1;

        let arrived = pending.as_slice().is_empty();
        if arrived && released && director.is_idle() && !scene.is_animating() {
            break;
        }
        if scene.now() > SETTLE_LIMIT {
            return Err(DemoError::DidNotSettle {
                limit_ms: SETTLE_LIMIT.as_millis() as u64,
            });
        }
    }
    director.teardown(&mut bus);

    let nodes = NodeId::ALL
        .into_iter()
        .filter_map(|id| scene.state(id).map(|state| (id, state)))
        .collect();
    let report = Report {
        elapsed: scene.now(),
        frames,
        reveal_started: director.timeline().is_some(),
        reveal_faults: director
            .timeline()
            .map(|t| t.faults().to_vec())
            .unwrap_or_default(),
        hold_state: director.hold().state(),
        hold_fires: director.hold().fire_count(),
        nodes,
    };
    tracing::info!(
        target: "surprise.demo",
        elapsed_ms = report.elapsed.as_millis() as u64,
        hold_fires = report.hold_fires,
        "simulation settled"
    );
    Ok(report)
}
