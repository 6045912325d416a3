//! DOT reader producing `cpg_core::Graph` values
//!
//! The reader is streaming: each call to [`GraphReader::next`] parses exactly
//! one graph, so a caller can process and drop a graph before the next one
//! is built. Subgraphs are flattened into their root graph.

pub mod error;
pub mod lexer;
pub mod parser;


pub use error::ParseError;
pub use parser::Parser;

use anyhow::Context;
use cpg_core::Graph;
use std::path::Path;

/// Iterator over the graphs of a DOT source. Stops after the first error.
pub struct GraphReader<'a> {
    parser: Parser<'a>,
    failed: bool,
}

impl Iterator for GraphReader<'_> {
    type Item = Result<Graph, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.parser.next_graph() {
            Ok(graph) => graph.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Read every graph of `source`, one at a time.
pub fn read_graphs(source: &str) -> GraphReader<'_> {
    GraphReader {
        parser: Parser::new(source),
        failed: false,
    }
}

/// Parse the first graph of `source`.
pub fn parse_graph(source: &str) -> Result<Graph, ParseError> {
    Parser::new(source)
        .next_graph()?
        .ok_or(ParseError::UnexpectedEof { expected: "`graph` or `digraph`" })
}

/// Load a DOT file into memory.
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("cannot read graph file {}", path.display()))
}
