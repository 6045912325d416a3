//! Compartment aggregation: one node per source file

use crate::error::Result;
use crate::graph::{AttributedGraph, Graph};
use crate::model::{EdgeId, MergeStats, NodeId, FILE_ATTR, LABEL_ATTR, VALUE_ATTR};
use crate::reduce::required_file;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Name of every graph produced by [`merge_compartments`].
pub const MERGED_GRAPH_NAME: &str = "kernel";

/// Output of the compartment merger.
#[derive(Debug)]
pub struct Merged {
    pub graph: Graph,
    pub stats: MergeStats,
}

/// Collapse the nodes of `graph` into one compartment per file.
///
/// Compartments appear in the order their file is first seen. Each edge
/// between two files becomes a single link per ordered compartment pair,
/// whose `value` is the sum of the underlying edge weights (see
/// [`edge_weight`]), saturating at the largest finite `f64`. Nodes with
/// an empty `file` have no compartment, so they and all their edges are
/// left out.
pub fn merge_compartments<G: AttributedGraph>(graph: &G) -> Result<Merged> {
    let mut merged = Graph::with_name(MERGED_GRAPH_NAME, true);
    let mut compartments: HashMap<String, NodeId> = HashMap::new();

    for node in graph.nodes() {
        let file = required_file(graph, node)?;
        if file.is_empty() || compartments.contains_key(file) {
            continue;
        }
        let compartment = merged.create_node(file);
        merged.set_node_attr(compartment, LABEL_ATTR, file);
        merged.set_node_attr(compartment, FILE_ATTR, file);
        tracing::debug!(file, "created compartment");
        compartments.insert(file.to_string(), compartment);
    }

    let mut links: HashMap<(NodeId, NodeId), (EdgeId, f64)> = HashMap::new();
    let mut dropped_edges = 0;

    for node in graph.nodes() {
        let source = compartment_of(graph, node, &compartments)?;
        for edge in graph.out_edges(node) {
            let Some(head) = graph.head(edge) else {
                continue;
            };
            let target = compartment_of(graph, head, &compartments)?;
            let (Some(source), Some(target)) = (source, target) else {
                dropped_edges += 1;
                continue;
            };
            // Only reachable when intra-file edges were not reduced first.
            if source == target {
                continue;
            }

            let weight = edge_weight(graph.edge_attr(edge, VALUE_ATTR));
            match links.entry((source, target)) {
                Entry::Occupied(mut link) => {
                    let sum = &mut link.get_mut().1;
                    *sum = (*sum + weight).clamp(f64::MIN, f64::MAX);
                }
                Entry::Vacant(slot) => {
                    if let Some(id) = merged.create_edge(source, target) {
                        slot.insert((id, weight));
                    }
                }
            }
        }
    }

    for &(id, weight) in links.values() {
        merged.set_edge_attr(id, VALUE_ATTR, &format_weight(weight));
    }

    let stats = MergeStats {
        compartments: compartments.len(),
        links: merged.edge_count(),
        dropped_edges,
    };
    tracing::debug!(
        compartments = stats.compartments,
        links = stats.links,
        dropped_edges = stats.dropped_edges,
        "merged compartments"
    );

    Ok(Merged { graph: merged, stats })
}

fn compartment_of<G: AttributedGraph>(
    graph: &G,
    node: NodeId,
    compartments: &HashMap<String, NodeId>,
) -> Result<Option<NodeId>> {
    let file = required_file(graph, node)?;
    Ok(compartments.get(file).copied())
}

/// Weight an edge contributes to its compartment link: its numeric
/// `value`, or 1 when the value is absent, empty or not a number.
pub fn edge_weight(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|w| w.is_finite())
        .unwrap_or(1.0)
}

/// Render a summed weight, without a fractional part when it is integral.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < 1e15 {
        format!("{}", weight as i64)
    } else {
        weight.to_string()
    }
}
