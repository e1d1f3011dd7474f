use std::collections::BTreeMap;

use crate::geometry::SurfaceKey;

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<(SurfaceKey, usize), usize>,
    id: Option<u32>,
}

/// Assigns small integer ids to groups of faces keyed by their surfaces.
///
/// A group is described by the surface key of each face. The distinct keys
/// with their face counts form a path through a trie, one level per
/// `(surface, count)` pair in sorted order, so an equivalent face set always
/// reaches the same node and gets the same id, whatever the face identity or
/// order.
#[derive(Debug, Clone)]
pub struct HierarchicalIdGenerator {
    nodes: Vec<Node>,
    next_id: u32,
}

impl Default for HierarchicalIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchicalIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            next_id: 0,
        }
    }

    fn signature(keys: &[SurfaceKey]) -> Vec<(SurfaceKey, usize)> {
        let mut counts: BTreeMap<SurfaceKey, usize> = BTreeMap::new();
        for key in keys {
            *counts.entry(*key).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    fn node_for(&mut self, keys: &[SurfaceKey]) -> usize {
        let mut current = 0;
        for step in Self::signature(keys) {
            current = match self.nodes[current].children.get(&step) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[current].children.insert(step, child);
                    child
                }
            };
        }
        current
    }

    /// Returns the id of the group, assigning a fresh one on first sight.
    pub fn generate(&mut self, keys: &[SurfaceKey]) -> u32 {
        let node = self.node_for(keys);
        if let Some(id) = self.nodes[node].id {
            return id;
        }
        let id = self.next_id();
        self.nodes[node].id = Some(id);
        id
    }

    /// Records a known id for a group, e.g. one restored from a document.
    pub fn register(&mut self, keys: &[SurfaceKey], id: u32) {
        let node = self.node_for(keys);
        self.nodes[node].id = Some(id);
        self.sync_id(id);
    }

    /// Allocates an id that belongs to no group.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Makes sure future ids are greater than `id`.
    pub fn sync_id(&mut self, id: u32) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    /// Forgets every group; ids restart at `start`.
    pub fn reset(&mut self, start: u32) {
        self.nodes = vec![Node::default()];
        self.next_id = start;
    }
}
