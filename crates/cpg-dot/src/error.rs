//! Errors raised while reading DOT input

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{line}:{column}: unexpected {found}, expected {expected}")]
    Unexpected {
        line: usize,
        column: usize,
        found: String,
        expected: &'static str,
    },

    #[error("{line}:{column}: unterminated {what}")]
    Unterminated {
        line: usize,
        column: usize,
        what: &'static str,
    },

    #[error("{line}:{column}: invalid character `{ch}`")]
    InvalidChar { line: usize, column: usize, ch: char },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

impl ParseError {
    /// Line and column (both 1-based) the error points at, if any.
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            ParseError::Unexpected { line, column, .. }
            | ParseError::Unterminated { line, column, .. }
            | ParseError::InvalidChar { line, column, .. } => Some((line, column)),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}
