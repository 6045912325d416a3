//! Intra-file edge elimination

use crate::error::{CpgError, Result};
use crate::graph::AttributedGraph;
use crate::model::{NodeId, ReduceStats, FILE_ATTR};

/// Read the `file` attribute every input node must carry.
pub(crate) fn required_file<G: AttributedGraph>(graph: &G, node: NodeId) -> Result<&str> {
    graph
        .node_attr(node, FILE_ATTR)
        .ok_or_else(|| CpgError::MissingAttribute {
            node: graph.node_name(node).unwrap_or_default().to_string(),
            attribute: FILE_ATTR,
        })
}

/// An edge is intra-file when both endpoints name the same, non-empty file.
fn is_intra_file(file_n: &str, file_m: &str) -> bool {
    !file_n.is_empty() && file_n == file_m
}

/// Remove every edge whose endpoints belong to the same file, in place.
///
/// A head node left without edges is deleted right away. The tail node is
/// deleted once all of its outgoing edges were visited, but only if at
/// least one of them was removed: nodes that were isolated in the input
/// stay, since they hint at a problem with the extraction.
pub fn remove_intra_edges<G: AttributedGraph>(graph: &mut G) -> Result<ReduceStats> {
    let mut stats = ReduceStats::default();
    let mut cursor = graph.first_node();

    while let Some(node) = cursor {
        let mut next = graph.next_node(node);
        let mut reduced = false;
        let file_n = required_file(graph, node)?.to_string();

        for edge in graph.out_edges(node) {
            let Some(head) = graph.head(edge) else {
                continue;
            };
            if !is_intra_file(&file_n, required_file(graph, head)?) {
                continue;
            }

            graph.delete_edge(edge);
            stats.edges_removed += 1;
            reduced = true;

            // A self-loop leaves the decision to the end of this node.
            if head == node || graph.degree(head) > 0 {
                continue;
            }

            if next == Some(head) {
                next = graph.next_node(head);
            }
            graph.delete_node(head);
            stats.nodes_removed += 1;
        }

        if graph.degree(node) == 0 {
            if reduced {
                graph.delete_node(node);
                stats.nodes_removed += 1;
            } else {
                tracing::warn!(
                    node = graph.node_name(node).unwrap_or_default(),
                    "node has no edges in the input graph"
                );
                stats.isolated_nodes += 1;
            }
        }

        cursor = next;
    }

    tracing::debug!(
        edges_removed = stats.edges_removed,
        nodes_removed = stats.nodes_removed,
        isolated_nodes = stats.isolated_nodes,
        "removed intra-file edges"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::test_utils::{file_of, GraphBuilder};

    #[test]
    fn test_intra_edge_and_isolated_tail_removed() {
        let (mut graph, ids) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .node("C", "b.c")
            .edge("A", "B")
            .edge("B", "C")
            .build();

        let stats = remove_intra_edges(&mut graph).unwrap();

        assert_eq!(
            stats,
            ReduceStats {
                edges_removed: 1,
                nodes_removed: 1,
                isolated_nodes: 0,
            }
        );
        assert!(graph.node(ids["A"]).is_none());
        assert!(graph.node(ids["B"]).is_some());
        assert!(graph.node(ids["C"]).is_some());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_isolated_head_removed() {
        let (mut graph, ids) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .node("C", "b.c")
            .edge("A", "B")
            .edge("A", "C")
            .build();

        remove_intra_edges(&mut graph).unwrap();

        assert!(graph.node(ids["A"]).is_some());
        assert!(graph.node(ids["B"]).is_none());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_deleting_next_node_advances_cursor() {
        // B comes right after A and disappears while A is being visited;
        // C must still be visited.
        let (mut graph, ids) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .node("C", "b.c")
            .node("D", "b.c")
            .edge("A", "B")
            .edge("A", "D")
            .edge("C", "D")
            .build();

        remove_intra_edges(&mut graph).unwrap();

        assert!(graph.node(ids["B"]).is_none());
        assert!(graph.node(ids["C"]).is_none());
        assert!(graph.node(ids["A"]).is_some());
        assert!(graph.node(ids["D"]).is_some());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_empty_file_edges_kept() {
        let (mut graph, _) = GraphBuilder::new()
            .node("A", "")
            .node("B", "")
            .node("C", "a.c")
            .edge("A", "B")
            .edge("B", "C")
            .build();

        let stats = remove_intra_edges(&mut graph).unwrap();

        assert_eq!(stats, ReduceStats::default());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_never_reduced_isolated_node_kept() {
        let (mut graph, ids) = GraphBuilder::new()
            .node("lonely", "a.c")
            .node("orphan", "")
            .build();

        let stats = remove_intra_edges(&mut graph).unwrap();

        assert_eq!(stats.isolated_nodes, 2);
        assert!(graph.node(ids["lonely"]).is_some());
        assert!(graph.node(ids["orphan"]).is_some());
    }

    #[test]
    fn test_intra_file_self_loop() {
        let (mut graph, ids) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .node("C", "b.c")
            .edge("A", "A")
            .edge("B", "B")
            .edge("B", "C")
            .build();

        let stats = remove_intra_edges(&mut graph).unwrap();

        assert_eq!(stats.edges_removed, 2);
        assert!(graph.node(ids["A"]).is_none());
        assert!(graph.node(ids["B"]).is_some());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_intra_cycle() {
        let (mut graph, _) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .edge("A", "B")
            .edge("B", "A")
            .build();

        let stats = remove_intra_edges(&mut graph).unwrap();

        assert_eq!(stats.edges_removed, 2);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_missing_file_attribute() {
        let mut graph = Graph::new();
        graph.create_node("A");

        let err = remove_intra_edges(&mut graph).unwrap_err();

        assert!(err.is_precondition_violation());
        assert!(err.to_string().contains("`A`"));
    }

    #[test]
    fn test_failed_set_keeps_file_missing() {
        let mut graph = Graph::new();
        let a = graph.create_node("A");
        assert!(!graph.set_node_attr(NodeId(99), FILE_ATTR, "\"a.c\":1"));

        assert_eq!(graph.node_attr(a, FILE_ATTR), None);
        let err = remove_intra_edges(&mut graph).unwrap_err();
        assert!(matches!(err, CpgError::MissingAttribute { .. }));
    }

    #[test]
    fn test_surviving_edges_are_inter_file() {
        let (mut graph, _) = GraphBuilder::new()
            .node("A", "a.c")
            .node("B", "a.c")
            .node("C", "b.c")
            .node("D", "")
            .edge("A", "B")
            .edge("A", "C")
            .edge("C", "D")
            .edge("D", "A")
            .edge("B", "A")
            .build();

        remove_intra_edges(&mut graph).unwrap();

        for edge in graph.all_edges() {
            let tail = file_of(&graph, edge.source);
            let head = file_of(&graph, edge.target);
            assert!(tail.is_empty() || head.is_empty() || tail != head);
        }
    }
}
