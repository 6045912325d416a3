//! Pipeline driver: read, reduce, merge and emit every input graph

use anyhow::Context;
use cpg_core::{
    merge_compartments, remove_intra_edges, write_arc_diagram, AttributedGraph, Graph,
    NodeGranularity, OutputFormat, PipelineConfig,
};
use std::io::Write;
use std::path::Path;

/// Process every graph of the DOT file at `path`, writing one document per
/// graph to `out`. Graphs before a malformed one are still emitted.
pub fn run<W: Write>(config: PipelineConfig, path: &Path, mut out: W) -> anyhow::Result<()> {
    let source = cpg_dot::read_source(path)?;
    tracing::debug!(
        path = %path.display(),
        granularity = %config.granularity,
        format = %config.format,
        "processing input"
    );

    let mut processed = 0usize;
    for (index, graph) in cpg_dot::read_graphs(&source).enumerate() {
        let graph = graph.with_context(|| {
            format!("cannot parse graph #{} of {}", index + 1, path.display())
        })?;
        process_graph(config, graph, &mut out)
            .with_context(|| format!("cannot process graph #{} of {}", index + 1, path.display()))?;
        processed += 1;
    }

    tracing::debug!(graphs = processed, "input done");
    Ok(())
}

/// Reduce one graph, merge it when asked to, and emit the result.
fn process_graph<W: Write>(config: PipelineConfig, mut graph: Graph, out: &mut W) -> anyhow::Result<()> {
    remove_intra_edges(&mut graph)?;
    tracing::debug!(
        graph = graph.name(),
        remaining_nodes = graph.node_count(),
        remaining_edges = graph.edge_count(),
        "reduced graph"
    );

    match config.granularity {
        NodeGranularity::Function => emit(config.format, &graph, out),
        NodeGranularity::Compartment => {
            let merged = merge_compartments(&graph)?;
            emit(config.format, &merged.graph, out)
        }
    }
}

fn emit<G: AttributedGraph, W: Write>(format: OutputFormat, graph: &G, out: &mut W) -> anyhow::Result<()> {
    match format {
        OutputFormat::D3Arc => write_arc_diagram(graph, out),
    }
}
