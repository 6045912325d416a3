//! d3 arc-diagram serialization

use crate::graph::AttributedGraph;
use crate::model::{NodeId, FILE_ATTR, LABEL_ATTR, VALUE_ATTR};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Group rendered for nodes that are not associated with any file.
pub const NO_GROUP: &str = "NONE";

/// Label placeholder that stands for the node name.
const NODE_NAME_ESCAPE: &str = "\\N";

/// The JSON document consumed by the arc-diagram renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDiagram {
    pub nodes: Vec<ArcNode>,
    pub links: Vec<ArcLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcNode {
    pub id: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcLink {
    pub source: String,
    pub target: String,
    /// Edge weight, empty when the edge carries none.
    pub value: String,
}

/// Drop `leading` characters from the front and `trailing` from the back.
/// Values too short to strip render as the empty string.
fn strip_quoting(raw: &str, leading: usize, trailing: usize) -> String {
    let len = raw.chars().count();
    if len <= leading + trailing {
        return String::new();
    }
    raw.chars().skip(leading).take(len - leading - trailing).collect()
}

/// Node id as shown in the diagram: the label without its surrounding quotes.
pub fn display_label(raw: &str) -> String {
    strip_quoting(raw, 1, 1)
}

/// Group as shown in the diagram. File values carry an opening quote and
/// three trailing characters (closing quote plus a two character suffix)
/// that the renderer does not expect.
pub fn display_group(raw: &str) -> String {
    if raw.is_empty() {
        return NO_GROUP.to_string();
    }
    strip_quoting(raw, 1, 3)
}

/// Raw label of a node. Falls back to the node name when the label is
/// absent or is the `\N` placeholder.
fn raw_label<G: AttributedGraph>(graph: &G, node: NodeId) -> &str {
    match graph.node_attr(node, LABEL_ATTR) {
        Some(label) if label != NODE_NAME_ESCAPE => label,
        _ => graph.node_name(node).unwrap_or_default(),
    }
}

/// Collect nodes and links in graph order, without sorting.
pub fn build_arc_diagram<G: AttributedGraph>(graph: &G) -> ArcDiagram {
    let nodes = graph
        .nodes()
        .map(|node| ArcNode {
            id: display_label(raw_label(graph, node)),
            group: display_group(graph.node_attr(node, FILE_ATTR).unwrap_or_default()),
        })
        .collect();

    let mut links = Vec::with_capacity(graph.edge_count());
    for node in graph.nodes() {
        let source = display_label(raw_label(graph, node));
        for edge in graph.out_edges(node) {
            let Some(head) = graph.head(edge) else {
                continue;
            };
            links.push(ArcLink {
                source: source.clone(),
                target: display_label(raw_label(graph, head)),
                value: graph
                    .edge_attr(edge, VALUE_ATTR)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    ArcDiagram { nodes, links }
}

/// Write the arc diagram of `graph` as one pretty-printed JSON document.
pub fn write_arc_diagram<G, W>(graph: &G, mut writer: W) -> anyhow::Result<()>
where
    G: AttributedGraph,
    W: Write,
{
    let diagram = build_arc_diagram(graph);
    let json = serde_json::to_string_pretty(&diagram)?;
    writeln!(writer, "{}", json)?;
    writer.flush()?;
    Ok(())
}
