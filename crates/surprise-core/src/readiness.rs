#![forbid(unsafe_code)]

//! Scene readiness: wait until a named set of nodes all exist.
//!
//! [`ReadinessDetector`] holds a watch list and a latch. [`poll`] returns the
//! resolved mapping exactly once, the first time every watched id resolves.
//!
//! # State Machine
//!
//! ```text
//! Inert ──────────────────────────────────────────── (never leaves)
//! Watching ──(all ids resolve)──► Fired    (terminal)
//! Watching ──(cancel)──────────► Cancelled (terminal)
//! ```
//!
//! # Invariants
//!
//! 1. `poll` returns `Some` at most once per detector.
//! 2. The first `poll` always checks, covering nodes that existed before
//!    observation began; later polls check only after the registry revision
//!    moved.
//! 3. After `cancel`, `poll` never returns `Some`.
//! 4. An empty watch list yields an inert detector that never observes.
//!
//! [`poll`]: ReadinessDetector::poll

use crate::error::RevealError;
use crate::node::NodeId;
use crate::registry::{NodeRegistry, SceneNodes};

/// Observable detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Nothing to watch; the detector never fires.
    Inert,
    /// Waiting for the watch list to resolve.
    Watching,
    /// Fired; all further changes are ignored.
    Fired,
    /// Cancelled before firing.
    Cancelled,
}

/// Single-fire watcher over a [`NodeRegistry`].
#[derive(Debug)]
pub struct ReadinessDetector {
    required: Vec<NodeId>,
    state: ReadinessState,
    /// Revision at the last check; `None` until the first poll.
    last_revision: Option<u64>,
    checks: u32,
}

impl ReadinessDetector {
    /// Watch `required`, in order.
    #[must_use]
    pub fn new(required: &[NodeId]) -> Self {
        let state = if required.is_empty() {
            tracing::debug!(
                target: "surprise.readiness",
                error = %RevealError::ConfigurationEmpty,
                "readiness detector inert"
            );
            ReadinessState::Inert
        } else {
            ReadinessState::Watching
        };
        Self {
            required: required.to_vec(),
            state,
            last_revision: None,
            checks: 0,
        }
    }

    /// Check the registry and return the mapping if this is the moment the
    /// watch list became complete.
    pub fn poll(&mut self, registry: &dyn NodeRegistry) -> Option<SceneNodes> {
        if self.state != ReadinessState::Watching {
            return None;
        }

        let revision = registry.revision();
        if self.last_revision == Some(revision) {
            return None;
        }
        self.last_revision = Some(revision);
        self.checks += 1;

        let nodes = SceneNodes::resolve_all(registry, &self.required);
        match nodes {
            Some(nodes) => {
                self.state = ReadinessState::Fired;
                tracing::debug!(
                    target: "surprise.readiness",
                    revision,
                    checks = self.checks,
                    nodes = nodes.len(),
                    "scene ready"
                );
                Some(nodes)
            }
            None => {
                tracing::trace!(
                    target: "surprise.readiness",
                    revision,
                    missing = ?self.missing(registry),
                    "scene not ready"
                );
                None
            }
        }
    }

    /// Stop observing. No-op once fired.
    pub fn cancel(&mut self) {
        if self.state == ReadinessState::Watching {
            self.state = ReadinessState::Cancelled;
            tracing::debug!(target: "surprise.readiness", "readiness observation cancelled");
        }
    }

    /// Watched ids that do not resolve right now.
    #[must_use]
    pub fn missing(&self, registry: &dyn NodeRegistry) -> Vec<NodeId> {
        self.required
            .iter()
            .copied()
            .filter(|&id| registry.resolve(id).is_none())
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ReadinessState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state == ReadinessState::Fired
    }

    /// Number of full checks performed (polls that saw a new revision).
    #[inline]
    #[must_use]
    pub fn checks(&self) -> u32 {
        self.checks
    }

    #[must_use]
    pub fn required(&self) -> &[NodeId] {
        &self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;

    #[test]
    fn fires_immediately_when_already_present() {
        let scene = MemoryScene::new();
        scene.insert_batch(&NodeId::ALL);
        let mut detector = ReadinessDetector::new(&NodeId::ALL);
        let nodes = detector.poll(&scene).expect("ready on first poll");
        assert_eq!(nodes.len(), 11);
        assert!(detector.has_fired());
    }

    #[test]
    fn skips_check_when_revision_unchanged() {
        let scene = MemoryScene::new();
        scene.insert(NodeId::Cake);
        let mut detector = ReadinessDetector::new(&[NodeId::Cake, NodeId::Subtext]);
        assert!(detector.poll(&scene).is_none());
        assert!(detector.poll(&scene).is_none());
        assert_eq!(detector.checks(), 1);

        scene.insert(NodeId::Subtext);
        assert!(detector.poll(&scene).is_some());
        assert_eq!(detector.checks(), 2);
    }

    #[test]
    fn never_fires_twice() {
        let scene = MemoryScene::new();
        scene.insert(NodeId::Cake);
        let mut detector = ReadinessDetector::new(&[NodeId::Cake]);
        assert!(detector.poll(&scene).is_some());
        scene.insert_unrelated("banner");
        scene.remove(NodeId::Cake);
        scene.insert(NodeId::Cake);
        assert!(detector.poll(&scene).is_none());
    }

    #[test]
    fn empty_watch_list_is_inert() {
        let scene = MemoryScene::new();
        let mut detector = ReadinessDetector::new(&[]);
        assert_eq!(detector.state(), ReadinessState::Inert);
        assert!(detector.poll(&scene).is_none());
        assert_eq!(detector.checks(), 0);
    }

    #[test]
    fn cancel_prevents_firing() {
        let scene = MemoryScene::new();
        let mut detector = ReadinessDetector::new(&[NodeId::Cake]);
        assert!(detector.poll(&scene).is_none());
        detector.cancel();
        scene.insert(NodeId::Cake);
        assert!(detector.poll(&scene).is_none());
        assert_eq!(detector.state(), ReadinessState::Cancelled);
    }

    #[test]
    fn cancel_after_fire_keeps_fired() {
        let scene = MemoryScene::new();
        scene.insert(NodeId::Cake);
        let mut detector = ReadinessDetector::new(&[NodeId::Cake]);
        detector.poll(&scene);
        detector.cancel();
        assert_eq!(detector.state(), ReadinessState::Fired);
    }

    #[test]
    fn missing_lists_unresolved_ids_in_order() {
        let scene = MemoryScene::new();
        scene.insert(NodeId::Subtext);
        let detector =
            ReadinessDetector::new(&[NodeId::Cake, NodeId::Subtext, NodeId::ActionButton]);
        assert_eq!(
            detector.missing(&scene),
            vec![NodeId::Cake, NodeId::ActionButton]
        );
    }
}
