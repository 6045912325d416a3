//! Error type shared by the pipeline stages

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CpgError {
    /// A node lacks an attribute every input node must carry.
    #[error("node `{node}` has no `{attribute}` attribute")]
    MissingAttribute {
        node: String,
        attribute: &'static str,
    },

    #[error("unknown node granularity `{0}` (expected `function` or `compartment`)")]
    InvalidGranularity(String),

    #[error("unknown output format `{0}` (expected `d3-arc`)")]
    InvalidFormat(String),
}

impl CpgError {
    /// True for violations of the input graph's structural preconditions.
    /// These point at a broken upstream extraction, not at user input.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, CpgError::MissingAttribute { .. })
    }
}

pub type Result<T> = std::result::Result<T, CpgError>;
