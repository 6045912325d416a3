//! Pipeline configuration

use crate::error::CpgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which nodes the emitted diagram is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeGranularity {
    /// Reduced functions, no merging.
    Function,
    /// One node per source file.
    #[default]
    Compartment,
}

impl FromStr for NodeGranularity {
    type Err = CpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(NodeGranularity::Function),
            "compartment" => Ok(NodeGranularity::Compartment),
            other => Err(CpgError::InvalidGranularity(other.to_string())),
        }
    }
}

impl fmt::Display for NodeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeGranularity::Function => f.write_str("function"),
            NodeGranularity::Compartment => f.write_str("compartment"),
        }
    }
}

/// Serialization of the reduced graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// JSON consumed by d3 arc diagrams.
    #[default]
    D3Arc,
}

impl FromStr for OutputFormat {
    type Err = CpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d3-arc" => Ok(OutputFormat::D3Arc),
            other => Err(CpgError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::D3Arc => f.write_str("d3-arc"),
        }
    }
}

/// Options for one run, applied to every input graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub granularity: NodeGranularity,
    pub format: OutputFormat,
}
