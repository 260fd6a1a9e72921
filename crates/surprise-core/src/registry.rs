#![forbid(unsafe_code)]

//! The external node registry and the resolved node mapping.

use ahash::AHashMap;

use crate::node::{NodeId, NodeRef};

/// Addressable set of nodes owned by the host scene.
///
/// `revision` must change whenever nodes are added or removed. Watchers use
/// it as their structural-change notification and only re-resolve when it
/// moves.
pub trait NodeRegistry {
    /// Look up a node by id.
    fn resolve(&self, id: NodeId) -> Option<NodeRef>;

    /// Monotonic structural revision.
    fn revision(&self) -> u64;
}

/// Resolved `NodeId → node` mapping handed to the timeline.
#[derive(Clone, Default)]
pub struct SceneNodes {
    nodes: AHashMap<NodeId, NodeRef>,
}

impl SceneNodes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every id in `ids`, returning `None` if any is missing.
    #[must_use]
    pub fn resolve_all(registry: &dyn NodeRegistry, ids: &[NodeId]) -> Option<Self> {
        let mut nodes = AHashMap::with_capacity(ids.len());
        for &id in ids {
            nodes.insert(id, registry.resolve(id)?);
        }
        Some(Self { nodes })
    }

    /// Resolve whatever subset of `ids` exists right now.
    #[must_use]
    pub fn resolve_present(registry: &dyn NodeRegistry, ids: &[NodeId]) -> Self {
        let nodes = ids
            .iter()
            .filter_map(|&id| registry.resolve(id).map(|node| (id, node)))
            .collect();
        Self { nodes }
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeRef> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids present in the mapping, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for SceneNodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNodes")
            .field("ids", &self.ids())
            .finish()
    }
}
