//! Core data structures for the code property graph

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Source file a node was extracted from. Empty means "no file".
pub const FILE_ATTR: &str = "file";

/// Display name of a node, conventionally quoted.
pub const LABEL_ATTR: &str = "label";

/// Optional edge weight.
pub const VALUE_ATTR: &str = "value";

/// Stable handle of a node inside the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

/// Stable handle of an edge inside the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A single node: a function of the CPG, or a compartment after merging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    /// Unique name within the owning graph.
    pub name: String,
    /// Values set explicitly on this node.
    pub attributes: HashMap<String, String>,
}

impl GraphNode {
    pub fn new(name: impl Into<String>) -> Self {
        GraphNode {
            id: NodeId::default(),
            name: name.into(),
            attributes: HashMap::new(),
        }
    }
}

/// A directed edge (call or use relationship).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Values set explicitly on this edge.
    pub attributes: HashMap<String, String>,
}

impl GraphEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        GraphEdge {
            id: EdgeId::default(),
            source,
            target,
            attributes: HashMap::new(),
        }
    }
}

/// Counters reported by the intra-edge reducer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceStats {
    pub edges_removed: usize,
    pub nodes_removed: usize,
    /// Nodes that had no edges to begin with.
    pub isolated_nodes: usize,
}

/// Counters reported by the compartment merger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Distinct non-empty files seen.
    pub compartments: usize,
    /// Edges in the merged graph.
    pub links: usize,
    /// Input edges with an endpoint outside any compartment.
    pub dropped_edges: usize,
}
