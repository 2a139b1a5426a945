use super::component::{BomRef, Component};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Identity used by [`ComponentGraph`] to deduplicate nodes
pub trait GraphNode {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;
}

impl GraphNode for Component {
    type Key = BomRef;

    fn key(&self) -> BomRef {
        self.bom_ref().clone()
    }
}

/// Handle to a node stored in a [`ComponentGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

// Lets a graph of handles (the per-file delta) reference nodes owned elsewhere.
impl GraphNode for NodeId {
    type Key = NodeId;

    fn key(&self) -> NodeId {
        *self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Reflexive edges are not allowed: {node} cannot depend on itself")]
    SelfDependency { node: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge<'a> {
    pub start: NodeId,
    pub end: NodeId,
    pub metadata: Option<&'a str>,
}

/// Directed graph with identity-based node deduplication and idempotent edges.
///
/// Nodes are addressed by [`NodeId`]; the first node added for a given key is
/// the canonical instance and every later `add` with an equal key returns its
/// id. Edges are unique per `(start, end)` pair.
#[derive(Debug, Clone)]
pub struct ComponentGraph<T: GraphNode> {
    nodes: Vec<T>,
    index: IndexMap<T::Key, NodeId>,
    edges: IndexMap<(NodeId, NodeId), Option<String>>,
}

impl<T: GraphNode> Default for ComponentGraph<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }
}

impl<T: GraphNode> ComponentGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` unless an identity-equal node exists; returns the canonical id.
    pub fn add(&mut self, node: T) -> NodeId {
        match self.index.entry(node.key()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(node);
                entry.insert(id);
                id
            }
        }
    }

    /// Adds the edge `start -> end`, registering missing endpoints.
    ///
    /// A second connect for the same pair is a no-op, whatever its metadata.
    pub fn connect(&mut self, start: T, end: T, metadata: Option<&str>) -> Result<(), GraphError> {
        if start.key() == end.key() {
            return Err(GraphError::SelfDependency {
                node: format!("{:?}", start.key()),
            });
        }

        let start = self.add(start);
        let end = self.add(end);
        self.edges
            .entry((start, end))
            .or_insert_with(|| metadata.map(str::to_string));
        Ok(())
    }

    pub fn exists(&self, node: &T) -> bool {
        self.index.contains_key(&node.key())
    }

    pub fn find(&self, key: &T::Key) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)
    }

    /// Iterates over `(id, node)` pairs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn edges(&self) -> impl Iterator<Item = GraphEdge<'_>> {
        self.edges.iter().map(|(&(start, end), metadata)| GraphEdge {
            start,
            end,
            metadata: metadata.as_deref(),
        })
    }

    /// Ids of every node `node` has an edge to, in insertion order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .keys()
            .filter(move |(start, _)| *start == node)
            .map(|(_, end)| *end)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
    }
}
