//! Ordering and fallback tests for the reveal timeline, observed through the
//! in-memory scene journal.

use std::time::Duration;

use surprise_core::memory::{JournalKind, MemoryScene};
use surprise_core::script::{CATS_RIGHT_DELAY, FLAMES_DELAY, HIDDEN_AT_START};
use surprise_core::{
    InputBus, InterruptReason, NodeId, RevealConfig, RevealDirector, RevealError, Sequencer,
    TransitionStatus,
};

const FRAME: Duration = Duration::from_millis(16);

struct Harness {
    scene: MemoryScene,
    bus: InputBus,
    director: RevealDirector,
}

impl Harness {
    fn new(config: RevealConfig) -> Self {
        Self {
            scene: MemoryScene::new(),
            bus: InputBus::new(),
            director: RevealDirector::new(config),
        }
    }

    fn attach(&mut self) {
        self.director.attach(&mut self.bus, &self.scene);
    }

    fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.scene.advance(FRAME);
            self.director.tick(FRAME, &self.scene, &mut self.bus);
        }
    }

    fn started(&self, id: NodeId) -> Duration {
        self.scene
            .first(id, &JournalKind::TransitionStarted)
            .unwrap_or_else(|| panic!("{id} never started a transition"))
    }

    fn finished(&self, id: NodeId) -> Duration {
        self.scene
            .first(id, &JournalKind::TransitionSettled(TransitionStatus::Finished))
            .unwrap_or_else(|| panic!("{id} never finished a transition"))
    }
}

fn complete_run() -> Harness {
    let mut h = Harness::new(RevealConfig::default());
    h.scene.insert_batch(&NodeId::ALL);
    h.attach();
    h.run_frames(300);
    h
}

#[test]
fn reveal_runs_to_completion_without_faults() {
    let h = complete_run();
    let timeline = h.director.timeline().expect("reveal started");
    assert!(timeline.is_finished());
    assert!(timeline.faults().is_empty());
    for id in NodeId::ALL {
        let state = h.scene.state(id).unwrap();
        assert!(state.visible, "{id} should end visible");
        assert_eq!(state.opacity, 1.0, "{id} should end opaque");
        assert!(state.transform.is_neutral(), "{id} should end at rest");
    }
}

#[test]
fn initialize_hides_late_nodes_before_anything_animates() {
    let mut h = Harness::new(RevealConfig::default());
    h.scene.insert_batch(&NodeId::ALL);
    h.attach();
    for id in HIDDEN_AT_START {
        assert_eq!(h.scene.first(id, &JournalKind::Hidden), Some(Duration::ZERO));
    }
    // Cats start immediately; the heading is posed but waits for stage B.
    assert_eq!(h.started(NodeId::CatsLeft), Duration::ZERO);
    let heading = h.scene.state(NodeId::HeadingWow).unwrap();
    assert_eq!(heading.opacity, 0.0);
    h.run_frames(1);
    assert!(h.scene.first(NodeId::HeadingWow, &JournalKind::TransitionStarted).is_none());
}

#[test]
fn cats_right_starts_after_cats_left() {
    let h = complete_run();
    let left = h.started(NodeId::CatsLeft);
    let right = h.started(NodeId::CatsRight);
    assert!(right >= left + CATS_RIGHT_DELAY);
}

#[test]
fn stage_b_waits_for_both_cats() {
    let h = complete_run();
    let cats_done = h.finished(NodeId::CatsLeft).max(h.finished(NodeId::CatsRight));
    assert!(h.started(NodeId::HeadingWow) >= cats_done);
}

#[test]
fn stages_c_and_d_follow_in_order() {
    let h = complete_run();
    assert!(h.started(NodeId::Subtext) >= h.finished(NodeId::HeadingWow));
    assert!(h.started(NodeId::Cake) >= h.finished(NodeId::Subtext));
}

#[test]
fn stage_f_waits_for_delay_and_flames() {
    let h = complete_run();
    let cake_done = h.finished(NodeId::Cake);
    for flame in NodeId::FLAMES {
        let shown = h.scene.first(flame, &JournalKind::Shown).expect("flame shown");
        assert!(shown >= cake_done + FLAMES_DELAY);
        assert!(h.started(NodeId::ActionButton) >= shown);
    }
}

#[test]
fn missing_cake_does_not_block_other_stages() {
    let required: Vec<NodeId> = NodeId::ALL
        .into_iter()
        .filter(|&id| id != NodeId::Cake)
        .collect();
    let mut h = Harness::new(RevealConfig {
        required: required.clone(),
        ..RevealConfig::default()
    });
    h.scene.insert_batch(&required);
    h.attach();
    h.run_frames(300);

    let timeline = h.director.timeline().expect("reveal started");
    assert!(timeline.is_finished());
    assert!(
        timeline
            .faults()
            .iter()
            .all(|f| *f == RevealError::MissingNode { node: NodeId::Cake })
    );
    assert!(!timeline.faults().is_empty());
    for id in [
        NodeId::CatsLeft,
        NodeId::CatsRight,
        NodeId::HeadingWow,
        NodeId::Subtext,
        NodeId::ActionButton,
    ] {
        h.finished(id);
    }
    for flame in NodeId::FLAMES {
        assert!(h.scene.state(flame).unwrap().visible);
    }
}

#[test]
fn interrupted_transition_is_recorded_and_skipped() {
    let mut h = Harness::new(RevealConfig::default());
    h.scene.insert_batch(&NodeId::ALL);
    if let Some(subtext) = h.scene.node(NodeId::Subtext) {
        subtext.fail_transitions(Some(InterruptReason::Cancelled));
    }
    h.attach();
    h.run_frames(300);

    let timeline = h.director.timeline().expect("reveal started");
    assert!(timeline.is_finished());
    assert_eq!(
        timeline.faults(),
        &[RevealError::TransitionInterrupted {
            node: NodeId::Subtext,
            reason: InterruptReason::Cancelled,
        }]
    );
    h.finished(NodeId::Cake);
    h.finished(NodeId::ActionButton);
}

#[test]
fn stage_start_times_are_monotonic() {
    let h = complete_run();
    let timeline: &Sequencer = h.director.timeline().unwrap();
    let starts: Vec<Duration> = (0..timeline.stage_count())
        .map(|i| timeline.stage_started_at(i).expect("stage started"))
        .collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
}
