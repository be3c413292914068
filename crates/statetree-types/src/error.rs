use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced when parsing paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("empty segment at position {position} in path {path:?}")]
    EmptySegment { path: String, position: usize },
}

/// Errors produced by value conversions and root writes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    /// Only a map can be written at the root of a tree.
    #[error("cannot replace the root with a {found} value")]
    RootNotMap { found: ValueKind },
}

/// Result alias for path parsing.
pub type PathResult<T> = Result<T, PathError>;

/// Result alias for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
