//! Test utilities for cpg-core

use crate::graph::{AttributedGraph, Graph};
use crate::model::{NodeId, FILE_ATTR, LABEL_ATTR, VALUE_ATTR};
use std::collections::HashMap;

/// Fluent construction of small input graphs, keyed by node name.
pub struct GraphBuilder {
    graph: Graph,
    ids: HashMap<String, NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            graph: Graph::new(),
            ids: HashMap::new(),
        }
    }

    /// Add a node with a `file` attribute.
    pub fn node(mut self, name: &str, file: &str) -> Self {
        let id = self.graph.create_node(name);
        self.graph.set_node_attr(id, FILE_ATTR, file);
        self.ids.insert(name.to_string(), id);
        self
    }

    /// Add a node with both `label` and `file` attributes.
    pub fn labeled_node(self, name: &str, label: &str, file: &str) -> Self {
        let mut builder = self.node(name, file);
        let id = builder.ids[name];
        builder.graph.set_node_attr(id, LABEL_ATTR, label);
        builder
    }

    pub fn edge(mut self, from: &str, to: &str) -> Self {
        let (tail, head) = (self.ids[from], self.ids[to]);
        self.graph.create_edge(tail, head).expect("both endpoints exist");
        self
    }

    pub fn edge_with_value(mut self, from: &str, to: &str, value: &str) -> Self {
        let (tail, head) = (self.ids[from], self.ids[to]);
        let edge = self.graph.create_edge(tail, head).expect("both endpoints exist");
        self.graph.set_edge_attr(edge, VALUE_ATTR, value);
        self
    }

    pub fn build(self) -> (Graph, HashMap<String, NodeId>) {
        (self.graph, self.ids)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The `file` attribute of a node, empty if unset.
pub fn file_of(graph: &Graph, node: NodeId) -> String {
    graph.node_attr(node, FILE_ATTR).unwrap_or_default().to_string()
}

/// Sorted names of the live nodes of a graph.
pub fn node_names(graph: &Graph) -> Vec<String> {
    let mut names: Vec<String> = graph
        .nodes()
        .filter_map(|n| graph.node_name(n).map(str::to_string))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_wires_edges() {
        let (graph, ids) = GraphBuilder::new()
            .node("f", "a.c")
            .labeled_node("g", "\"g\"", "b.c")
            .edge_with_value("f", "g", "2")
            .build();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(file_of(&graph, ids["g"]), "b.c");
        assert_eq!(graph.node_attr(ids["g"], LABEL_ATTR), Some("\"g\""));
        assert_eq!(node_names(&graph), vec!["f", "g"]);
    }
}
