//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Ways a flat record list can fail to describe a single tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedHierarchy {
    #[error("multiple root records: '{first}' and '{second}'")]
    MultipleRoots { first: String, second: String },

    #[error("no root record (input is empty)")]
    NoRoot,

    #[error("record with empty name")]
    EmptyName,

    #[error("empty path segment in '{name}'")]
    EmptySegment { name: String },

    #[error("duplicate record: '{name}'")]
    DuplicateRecord { name: String },

    #[error("delimiter must not be empty")]
    EmptyDelimiter,
}

/// Domain errors represent violations of the hierarchy and geometry rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed hierarchy: {0}")]
    MalformedHierarchy(#[from] MalformedHierarchy),

    #[error("split depth {depth} exceeds maximum of {max}")]
    InvalidSplitDepth { depth: u32, max: u32 },
}
