//! Attributed graph capability and its petgraph-backed implementation

use crate::model::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::Direction;
use std::collections::HashMap;

/// Name given to graphs built from scratch rather than read from input.
pub const DEFAULT_GRAPH_NAME: &str = "G";

/// Operations the pipeline stages need from a graph store.
///
/// Handles stay valid until the object they name is deleted, and node
/// iteration is a cursor over handles: `next_node` accepts a handle that
/// has already been deleted and returns the first live node after it.
/// Attribute reads follow declared-default semantics: a key declared for
/// nodes (or edges) reads as its default on every object that has not set
/// its own value, while a key that was never declared reads as `None`.
pub trait AttributedGraph {
    /// Return the node called `name`, creating it if needed.
    fn create_node(&mut self, name: &str) -> NodeId;

    /// Create an edge from `tail` to `head`. `None` if either is missing.
    fn create_edge(&mut self, tail: NodeId, head: NodeId) -> Option<EdgeId>;

    /// Delete a node together with its incident edges.
    fn delete_node(&mut self, node: NodeId) -> bool;

    fn delete_edge(&mut self, edge: EdgeId) -> bool;

    /// Start of node iteration. Nodes come in creation order, except that a
    /// node created after a deletion may reuse the freed handle and take
    /// its place in the order.
    fn first_node(&self) -> Option<NodeId>;

    /// First live node after `node` in iteration order.
    fn next_node(&self, node: NodeId) -> Option<NodeId>;

    /// Outgoing edges of `node`, in creation order. The result is a
    /// snapshot, so callers may delete edges while walking it.
    fn out_edges(&self, node: NodeId) -> Vec<EdgeId>;

    fn head(&self, edge: EdgeId) -> Option<NodeId>;

    fn tail(&self, edge: EdgeId) -> Option<NodeId>;

    /// Number of incident edges, incoming plus outgoing.
    fn degree(&self, node: NodeId) -> usize;

    fn node_name(&self, node: NodeId) -> Option<&str>;

    fn node_attr(&self, node: NodeId, key: &str) -> Option<&str>;

    fn set_node_attr(&mut self, node: NodeId, key: &str, value: &str) -> bool;

    fn edge_attr(&self, edge: EdgeId, key: &str) -> Option<&str>;

    fn set_edge_attr(&mut self, edge: EdgeId, key: &str, value: &str) -> bool;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Iterate node handles through the `first_node`/`next_node` cursor.
    fn nodes(&self) -> Nodes<'_, Self>
    where
        Self: Sized,
    {
        Nodes {
            graph: self,
            next: self.first_node(),
        }
    }
}

/// Iterator over the nodes of an [`AttributedGraph`].
pub struct Nodes<'a, G> {
    graph: &'a G,
    next: Option<NodeId>,
}

impl<G: AttributedGraph> Iterator for Nodes<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.next_node(current);
        Some(current)
    }
}

/// The code property graph — a directed multigraph with stable node/edge indices.
///
/// Deleting a node or edge leaves a vacant slot behind, so the handles of
/// every other object remain valid. Iteration follows ascending handle
/// order, which is creation order as long as nothing is created after a
/// deletion.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    name: String,
    strict: bool,
    name_index: HashMap<String, NodeId>,
    attributes: HashMap<String, String>,
    node_defaults: HashMap<String, String>,
    edge_defaults: HashMap<String, String>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("strict", &self.strict)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

fn node_index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}

fn edge_index(id: EdgeId) -> EdgeIndex {
    EdgeIndex::new(id.0 as usize)
}

fn node_id(idx: NodeIndex) -> NodeId {
    NodeId(idx.index() as u64)
}

fn edge_id(idx: EdgeIndex) -> EdgeId {
    EdgeId(idx.index() as u64)
}

impl Graph {
    pub fn new() -> Self {
        Self::with_name(DEFAULT_GRAPH_NAME, false)
    }

    /// A strict graph holds at most one edge per ordered node pair.
    pub fn with_name(name: impl Into<String>, strict: bool) -> Self {
        Graph {
            inner: StableDiGraph::new(),
            name: name.into(),
            strict,
            name_index: HashMap::new(),
            attributes: HashMap::new(),
            node_defaults: HashMap::new(),
            edge_defaults: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Find a node by its unique name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.inner.node_weight(node_index(id))
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.inner.edge_weight(edge_index(id))
    }

    /// Iterate over all edges.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    pub fn graph_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_graph_attr(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    /// Declare a node attribute with a default value.
    ///
    /// A fresh declaration applies to every node that has not set the key.
    /// Re-declaring only changes the default for the future: nodes that
    /// were reading the old default keep it as their own value.
    pub fn declare_node_attr(&mut self, key: &str, default: &str) {
        if let Some(previous) = self.node_defaults.get(key).cloned() {
            let indices: Vec<NodeIndex> = self.inner.node_indices().collect();
            for idx in indices {
                self.inner[idx]
                    .attributes
                    .entry(key.to_string())
                    .or_insert_with(|| previous.clone());
            }
        }
        self.node_defaults
            .insert(key.to_string(), default.to_string());
    }

    /// Declare an edge attribute with a default value. Same rules as
    /// [`Graph::declare_node_attr`].
    pub fn declare_edge_attr(&mut self, key: &str, default: &str) {
        if let Some(previous) = self.edge_defaults.get(key).cloned() {
            let indices: Vec<EdgeIndex> = self.inner.edge_indices().collect();
            for idx in indices {
                self.inner[idx]
                    .attributes
                    .entry(key.to_string())
                    .or_insert_with(|| previous.clone());
            }
        }
        self.edge_defaults
            .insert(key.to_string(), default.to_string());
    }

    fn scan_from(&self, start: usize) -> Option<NodeId> {
        (start..self.inner.node_bound())
            .map(NodeIndex::new)
            .find(|&idx| self.inner.contains_node(idx))
            .map(node_id)
    }
}

impl AttributedGraph for Graph {
    fn create_node(&mut self, name: &str) -> NodeId {
        if let Some(&existing) = self.name_index.get(name) {
            return existing;
        }
        let idx = self.inner.add_node(GraphNode::new(name));
        let id = node_id(idx);
        self.inner[idx].id = id;
        self.name_index.insert(name.to_string(), id);
        id
    }

    fn create_edge(&mut self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        let (a, b) = (node_index(tail), node_index(head));
        if !self.inner.contains_node(a) || !self.inner.contains_node(b) {
            return None;
        }
        if self.strict {
            if let Some(existing) = self.inner.find_edge(a, b) {
                return Some(edge_id(existing));
            }
        }
        let idx = self.inner.add_edge(a, b, GraphEdge::new(tail, head));
        let id = edge_id(idx);
        self.inner[idx].id = id;
        Some(id)
    }

    fn delete_node(&mut self, node: NodeId) -> bool {
        match self.inner.remove_node(node_index(node)) {
            Some(removed) => {
                self.name_index.remove(&removed.name);
                true
            }
            None => false,
        }
    }

    fn delete_edge(&mut self, edge: EdgeId) -> bool {
        self.inner.remove_edge(edge_index(edge)).is_some()
    }

    fn first_node(&self) -> Option<NodeId> {
        self.scan_from(0)
    }

    fn next_node(&self, node: NodeId) -> Option<NodeId> {
        self.scan_from(node.0 as usize + 1)
    }

    fn out_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let idx = node_index(node);
        if !self.inner.contains_node(idx) {
            return Vec::new();
        }
        let mut edges: Vec<EdgeId> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge_ref| edge_id(edge_ref.id()))
            .collect();
        // petgraph walks adjacency lists newest first
        edges.sort_unstable();
        edges
    }

    fn head(&self, edge: EdgeId) -> Option<NodeId> {
        self.inner
            .edge_endpoints(edge_index(edge))
            .map(|(_, head)| node_id(head))
    }

    fn tail(&self, edge: EdgeId) -> Option<NodeId> {
        self.inner
            .edge_endpoints(edge_index(edge))
            .map(|(tail, _)| node_id(tail))
    }

    fn degree(&self, node: NodeId) -> usize {
        let idx = node_index(node);
        if !self.inner.contains_node(idx) {
            return 0;
        }
        self.inner.edges_directed(idx, Direction::Outgoing).count()
            + self.inner.edges_directed(idx, Direction::Incoming).count()
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn node_attr(&self, node: NodeId, key: &str) -> Option<&str> {
        let node = self.node(node)?;
        node.attributes
            .get(key)
            .or_else(|| self.node_defaults.get(key))
            .map(String::as_str)
    }

    fn set_node_attr(&mut self, node: NodeId, key: &str, value: &str) -> bool {
        let Some(node) = self.inner.node_weight_mut(node_index(node)) else {
            return false;
        };
        node.attributes.insert(key.to_string(), value.to_string());
        self.node_defaults
            .entry(key.to_string())
            .or_default();
        true
    }

    fn edge_attr(&self, edge: EdgeId, key: &str) -> Option<&str> {
        let edge = self.edge(edge)?;
        edge.attributes
            .get(key)
            .or_else(|| self.edge_defaults.get(key))
            .map(String::as_str)
    }

    fn set_edge_attr(&mut self, edge: EdgeId, key: &str, value: &str) -> bool {
        let Some(edge) = self.inner.edge_weight_mut(edge_index(edge)) else {
            return false;
        };
        edge.attributes.insert(key.to_string(), value.to_string());
        self.edge_defaults
            .entry(key.to_string())
            .or_default();
        true
    }

    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
