#![forbid(unsafe_code)]

//! In-memory scene: a [`NodeRegistry`] whose nodes play their own
//! transitions on a virtual clock.
//!
//! [`MemoryScene`] stands in for the host scene in tests and in the headless
//! demo. Every externally visible change is appended to a journal with the
//! virtual time it happened at, so ordering properties ("stage B never starts
//! before stage A settles") can be asserted directly.
//!
//! # Frame protocol
//!
//! Call [`MemoryScene::advance`] once per frame *before* ticking whoever
//! polls the transition handles. Transition start and settle times are
//! journaled at their exact virtual instants even when a frame straddles
//! them.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;

use crate::node::{Keyframe, NodeId, NodeRef, NodeState, Transform, VisualNode};
use crate::registry::NodeRegistry;
use crate::transition::{
    Fill, InterruptReason, TransitionHandle, TransitionSpec, TransitionStatus,
};
use crate::tween::{Animation, Tween};

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Something observable that happened to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalKind {
    /// A transition's delay elapsed and it began animating.
    TransitionStarted,
    /// A transition settled.
    TransitionSettled(TransitionStatus),
    /// `visible` went from true to false.
    Hidden,
    /// `visible` went from false to true.
    Shown,
    /// Text content was replaced.
    TextChanged(String),
}

/// One journal line.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub at: Duration,
    pub node: NodeId,
    pub kind: JournalKind,
}

#[derive(Debug, Default)]
struct SceneClock {
    now: Cell<Duration>,
    journal: RefCell<Vec<JournalEntry>>,
}

impl SceneClock {
    fn record(&self, at: Duration, node: NodeId, kind: JournalKind) {
        self.journal.borrow_mut().push(JournalEntry { at, node, kind });
    }
}

// ---------------------------------------------------------------------------
// MemoryNode
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveTransition {
    tween: Tween,
    handle: TransitionHandle,
    fill: Fill,
    before: Keyframe,
    begun_at: Duration,
    delay: Duration,
    duration: Duration,
    started: bool,
}

/// A node living in a [`MemoryScene`].
#[derive(Debug)]
pub struct MemoryNode {
    id: NodeId,
    state: RefCell<NodeState>,
    active: RefCell<Option<ActiveTransition>>,
    fault: Cell<Option<InterruptReason>>,
    clock: Rc<SceneClock>,
}

impl MemoryNode {
    fn new(id: NodeId, clock: Rc<SceneClock>) -> Self {
        Self {
            id,
            state: RefCell::new(NodeState::default()),
            active: RefCell::new(None),
            fault: Cell::new(None),
            clock,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Make every future transition on this node settle immediately as
    /// interrupted with `reason`. `None` restores normal behaviour.
    pub fn fail_transitions(&self, reason: Option<InterruptReason>) {
        self.fault.set(reason);
    }

    /// Whether a transition is currently pending or running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Interrupt the in-flight transition, if any.
    pub fn interrupt(&self, reason: InterruptReason) {
        let active = self.active.borrow_mut().take();
        if let Some(active) = active {
            active.handle.interrupt(reason);
            self.clock.record(
                self.clock.now.get(),
                self.id,
                JournalKind::TransitionSettled(active.handle.status()),
            );
        }
    }

    fn write_frame(&self, frame: Keyframe) {
        let mut state = self.state.borrow_mut();
        state.opacity = frame.opacity;
        state.transform = frame.transform;
    }

    fn advance(&self, dt: Duration) {
        let mut slot = self.active.borrow_mut();
        let Some(active) = slot.as_mut() else {
            return;
        };
        active.tween.tick(dt);

        if !active.started && active.tween.has_started() {
            active.started = true;
            active.handle.set(TransitionStatus::Running);
            self.clock.record(
                active.begun_at + active.delay,
                self.id,
                JournalKind::TransitionStarted,
            );
        }

        if let Some(frame) = active.tween.frame() {
            self.write_frame(frame);
        }

        if active.tween.is_complete() {
            if active.fill == Fill::None {
                self.write_frame(active.before);
            }
            active.handle.finish();
            self.clock.record(
                active.begun_at + active.delay + active.duration,
                self.id,
                JournalKind::TransitionSettled(TransitionStatus::Finished),
            );
            *slot = None;
        }
    }
}

impl VisualNode for MemoryNode {
    fn state(&self) -> NodeState {
        self.state.borrow().clone()
    }

    fn set_opacity(&self, opacity: f32) {
        self.state.borrow_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    fn set_transform(&self, transform: Transform) {
        self.state.borrow_mut().transform = transform;
    }

    fn set_visible(&self, visible: bool) {
        let was = std::mem::replace(&mut self.state.borrow_mut().visible, visible);
        if was != visible {
            let kind = if visible {
                JournalKind::Shown
            } else {
                JournalKind::Hidden
            };
            self.clock.record(self.clock.now.get(), self.id, kind);
        }
    }

    fn set_interactive(&self, interactive: bool) {
        self.state.borrow_mut().interactive = interactive;
    }

    fn set_text(&self, text: &str) {
        self.state.borrow_mut().text = text.to_string();
        self.clock.record(
            self.clock.now.get(),
            self.id,
            JournalKind::TextChanged(text.to_string()),
        );
    }

    fn animate(&self, spec: &TransitionSpec) -> TransitionHandle {
        self.interrupt(InterruptReason::Superseded);

        let now = self.clock.now.get();
        if let Some(reason) = self.fault.get() {
            let status = TransitionStatus::Interrupted(reason);
            self.clock
                .record(now, self.id, JournalKind::TransitionSettled(status));
            return TransitionHandle::settled(status);
        }

        let handle = TransitionHandle::new();
        let active = ActiveTransition {
            tween: Tween::new(spec),
            handle: handle.clone(),
            fill: spec.fill,
            before: self.state.borrow().keyframe(),
            begun_at: now,
            delay: spec.delay,
            duration: spec.duration,
            started: false,
        };
        *self.active.borrow_mut() = Some(active);

        // Zero-delay transitions start (and zero-length ones finish) now.
        self.advance(Duration::ZERO);
        handle
    }
}

// ---------------------------------------------------------------------------
// MemoryScene
// ---------------------------------------------------------------------------

/// In-memory [`NodeRegistry`] with a virtual clock and a change journal.
#[derive(Debug, Default)]
pub struct MemoryScene {
    clock: Rc<SceneClock>,
    nodes: RefCell<BTreeMap<NodeId, Rc<MemoryNode>>>,
    /// Unrelated nodes: they only contribute structural churn.
    extras: RefCell<BTreeSet<String>>,
    revision: Cell<u64>,
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) {
        self.revision.set(self.revision.get() + 1);
    }

    fn insert_quiet(&self, id: NodeId) -> Rc<MemoryNode> {
        let mut nodes = self.nodes.borrow_mut();
        Rc::clone(
            nodes
                .entry(id)
                .or_insert_with(|| Rc::new(MemoryNode::new(id, Rc::clone(&self.clock)))),
        )
    }

    /// Add a node (or return the existing one) as one structural change.
    pub fn insert(&self, id: NodeId) -> Rc<MemoryNode> {
        let node = self.insert_quiet(id);
        self.bump();
        node
    }

    /// Add several nodes as a single structural change.
    pub fn insert_batch(&self, ids: &[NodeId]) {
        for &id in ids {
            self.insert_quiet(id);
        }
        self.bump();
    }

    /// Add a node the reveal does not care about.
    pub fn insert_unrelated(&self, name: &str) {
        self.extras.borrow_mut().insert(name.to_string());
        self.bump();
    }

    /// Remove a node. In-flight transitions on it are interrupted.
    pub fn remove(&self, id: NodeId) -> bool {
        let removed = self.nodes.borrow_mut().remove(&id);
        match removed {
            Some(node) => {
                node.interrupt(InterruptReason::Detached);
                self.bump();
                true
            }
            None => false,
        }
    }

    /// Concrete handle to a node, for instrumentation.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Rc<MemoryNode>> {
        self.nodes.borrow().get(&id).cloned()
    }

    /// Snapshot of a node's state.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.borrow().get(&id).map(|node| node.state())
    }

    /// Advance the virtual clock and every in-flight transition.
    pub fn advance(&self, dt: Duration) {
        self.clock.now.set(self.clock.now.get().saturating_add(dt));
        let nodes: Vec<Rc<MemoryNode>> = self.nodes.borrow().values().cloned().collect();
        for node in nodes {
            node.advance(dt);
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now.get()
    }

    /// Every journal entry so far, in recording order.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.clock.journal.borrow().clone()
    }

    /// Journal entries for one node.
    #[must_use]
    pub fn journal_for(&self, id: NodeId) -> Vec<JournalEntry> {
        self.clock
            .journal
            .borrow()
            .iter()
            .filter(|entry| entry.node == id)
            .cloned()
            .collect()
    }

    /// Time of the first journal entry for `id` matching `kind`.
    #[must_use]
    pub fn first(&self, id: NodeId, kind: &JournalKind) -> Option<Duration> {
        self.clock
            .journal
            .borrow()
            .iter()
            .find(|entry| entry.node == id && entry.kind == *kind)
            .map(|entry| entry.at)
    }

    /// Whether any transition in the scene is still pending or running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.nodes.borrow().values().any(|node| node.is_animating())
    }
}

impl NodeRegistry for MemoryScene {
    fn resolve(&self, id: NodeId) -> Option<NodeRef> {
        self.nodes
            .borrow()
            .get(&id)
            .map(|node| Rc::clone(node) as NodeRef)
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    const MS_100: Duration = Duration::from_millis(100);

    fn fade(node: NodeId, delay: Duration) -> TransitionSpec {
        TransitionSpec::between(
            node,
            Keyframe::new(0.0, Transform::NEUTRAL),
            Keyframe::REST,
            Duration::from_millis(200),
        )
        .delay(delay)
    }

    #[test]
    fn structural_changes_bump_revision() {
        let scene = MemoryScene::new();
        assert_eq!(scene.revision(), 0);
        scene.insert(NodeId::Cake);
        scene.insert_batch(&NodeId::FLAMES);
        scene.insert_unrelated("footer");
        assert_eq!(scene.revision(), 3);
        assert!(scene.remove(NodeId::Cake));
        assert!(!scene.remove(NodeId::Cake));
        assert_eq!(scene.revision(), 4);
    }

    #[test]
    fn transition_journals_exact_start_and_settle() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::CatsRight);
        let handle = node.animate(&fade(NodeId::CatsRight, Duration::from_millis(150)));
        assert_eq!(handle.status(), TransitionStatus::Pending);

        for _ in 0..4 {
            scene.advance(MS_100);
        }
        assert_eq!(handle.status(), TransitionStatus::Finished);
        assert_eq!(
            scene.first(NodeId::CatsRight, &JournalKind::TransitionStarted),
            Some(Duration::from_millis(150))
        );
        assert_eq!(
            scene.first(
                NodeId::CatsRight,
                &JournalKind::TransitionSettled(TransitionStatus::Finished)
            ),
            Some(Duration::from_millis(350))
        );
    }

    #[test]
    fn zero_delay_applies_first_frame_immediately() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Cake);
        let handle = node.animate(&fade(NodeId::Cake, Duration::ZERO));
        assert_eq!(handle.status(), TransitionStatus::Running);
        assert_eq!(node.state().opacity, 0.0);
    }

    #[test]
    fn fill_forwards_holds_last_frame() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Cake);
        node.set_opacity(0.0);
        let spec = fade(NodeId::Cake, Duration::ZERO).easing(Easing::OVERSHOOT);
        node.animate(&spec);
        scene.advance(Duration::from_secs(1));
        assert_eq!(node.state().opacity, 1.0);
        assert!(node.state().transform.is_neutral());
    }

    #[test]
    fn fill_none_restores_previous_pose() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Cake);
        node.set_opacity(0.25);
        node.animate(&fade(NodeId::Cake, Duration::ZERO).fill(Fill::None));
        scene.advance(Duration::from_secs(1));
        assert_eq!(node.state().opacity, 0.25);
    }

    #[test]
    fn new_transition_supersedes_running_one() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::HeadingWow);
        let first = node.animate(&fade(NodeId::HeadingWow, Duration::ZERO));
        let second = node.animate(&fade(NodeId::HeadingWow, Duration::ZERO));
        assert_eq!(
            first.status(),
            TransitionStatus::Interrupted(InterruptReason::Superseded)
        );
        assert!(!second.is_settled());
    }

    #[test]
    fn injected_fault_settles_immediately() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Subtext);
        node.fail_transitions(Some(InterruptReason::Cancelled));
        let handle = node.animate(&fade(NodeId::Subtext, Duration::ZERO));
        assert_eq!(
            handle.status(),
            TransitionStatus::Interrupted(InterruptReason::Cancelled)
        );
        assert!(!node.is_animating());
    }

    #[test]
    fn removal_interrupts_in_flight_transition() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Cake);
        let handle = node.animate(&fade(NodeId::Cake, Duration::ZERO));
        scene.remove(NodeId::Cake);
        assert_eq!(
            handle.status(),
            TransitionStatus::Interrupted(InterruptReason::Detached)
        );
        assert!(scene.resolve(NodeId::Cake).is_none());
    }

    #[test]
    fn visibility_changes_are_journaled_once() {
        let scene = MemoryScene::new();
        let node = scene.insert(NodeId::Flame1);
        node.set_visible(false);
        node.set_visible(false);
        node.set_visible(true);
        let kinds: Vec<JournalKind> = scene
            .journal_for(NodeId::Flame1)
            .into_iter()
            .map(|entry| entry.kind)
            .collect();
        assert_eq!(kinds, vec![JournalKind::Hidden, JournalKind::Shown]);
    }
}
