//! cpg-core — Code property graph model, reduction, compartment merging and arc-diagram output

pub mod graph;
pub mod model;
pub mod error;
pub mod config;
pub mod reduce;
pub mod aggregation;
pub mod emit;


#[cfg(test)]
pub mod test_utils;

pub use model::{NodeId, EdgeId, GraphNode, GraphEdge, ReduceStats, MergeStats, FILE_ATTR, LABEL_ATTR, VALUE_ATTR};
pub use graph::{AttributedGraph, Graph, Nodes, DEFAULT_GRAPH_NAME};
pub use error::{CpgError, Result};
pub use config::{NodeGranularity, OutputFormat, PipelineConfig};
pub use reduce::remove_intra_edges;
pub use aggregation::{merge_compartments, edge_weight, format_weight, Merged, MERGED_GRAPH_NAME};
pub use emit::{build_arc_diagram, write_arc_diagram, display_label, display_group, ArcDiagram, ArcNode, ArcLink, NO_GROUP};
