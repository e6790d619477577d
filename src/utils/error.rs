//! Error handling for table operations
//!
//! This module provides a unified error type and result type for every
//! structural operation. Precondition failures are reported before any edit
//! is applied; malformed trees are never reported here, they are repaired by
//! the post-fixers instead.

use thiserror::Error;

use crate::core::tree::{NodeId, NodeKind};

/// Why a merge request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFailure {
    /// The union of the cells is not a perfect rectangle
    NotRectangular,
    /// The cells belong to different tables
    DifferentTables,
    /// The merge would cross the heading rows/columns boundary
    CrossesHeading,
    /// There is no cell with a matching edge in the requested direction
    NoAdjacentCell,
    /// Fewer than two distinct cells were selected
    TooFewCells,
}

impl std::fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MergeFailure::NotRectangular => "the selected cells do not form a rectangle",
            MergeFailure::DifferentTables => "the cells belong to different tables",
            MergeFailure::CrossesHeading => "the merged cell would cross the heading boundary",
            MergeFailure::NoAdjacentCell => "no adjacent cell with a matching edge",
            MergeFailure::TooFewCells => "at least two cells are required",
        };
        f.write_str(text)
    }
}

/// Why a split request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitFailure {
    /// The cell spans a single column, so it cannot be split vertically
    SingleColumn,
    /// The cell spans a single row, so it cannot be split horizontally
    SingleRow,
    /// The split offset does not fall strictly inside the cell
    OffsetOutOfRange,
}

impl std::fmt::Display for SplitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SplitFailure::SingleColumn => "the cell spans a single column",
            SplitFailure::SingleRow => "the cell spans a single row",
            SplitFailure::OffsetOutOfRange => "the split offset is outside the cell",
        };
        f.write_str(text)
    }
}

/// Table operation error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// The node id does not refer to a live node
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
    /// The node exists but has the wrong kind for the operation
    #[error("expected {expected} node, found {found} ({node})")]
    UnexpectedNode {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
    /// The edit would put a node where the schema does not allow it
    #[error("{child} is not allowed inside {parent}")]
    SchemaViolation { parent: NodeKind, child: NodeKind },
    /// An index argument is past the end of the table
    #[error("{what} index {index} is out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    /// Merge precondition failure
    #[error("cannot merge cells: {0}")]
    MergeNotPossible(MergeFailure),
    /// Split precondition failure
    #[error("cannot split cell: {0}")]
    SplitNotPossible(SplitFailure),
    /// Heading count larger than the table
    #[error("cannot set {count} heading {what}: the table has {max}")]
    HeadingOutOfRange {
        what: &'static str,
        count: usize,
        max: usize,
    },
    /// The removal would leave the table without rows or columns
    #[error("cannot remove every {what} of a table")]
    RemovesEverything { what: &'static str },
    /// Exchange format could not be read or written
    #[error("exchange error: {0}")]
    Exchange(String),
    /// Invalid input (command arguments, markup)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

// Convenience constructors for errors
impl TableError {
    pub fn unexpected(node: NodeId, expected: NodeKind, found: NodeKind) -> Self {
        TableError::UnexpectedNode {
            node,
            expected,
            found,
        }
    }

    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        TableError::IndexOutOfRange { what, index, len }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        TableError::InvalidInput(message.into())
    }

    pub fn exchange(message: impl Into<String>) -> Self {
        TableError::Exchange(message.into())
    }

    /// Whether the error is a precondition refusal (as opposed to a bad id)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TableError::MergeNotPossible(_)
                | TableError::SplitNotPossible(_)
                | TableError::HeadingOutOfRange { .. }
                | TableError::RemovesEverything { .. }
                | TableError::IndexOutOfRange { .. }
        )
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Exchange(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_error_display() {
        let err = TableError::MergeNotPossible(MergeFailure::NotRectangular);
        assert!(err.to_string().contains("cannot merge"));
        assert!(err.to_string().contains("rectangle"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_heading_error_display() {
        let err = TableError::HeadingOutOfRange {
            what: "rows",
            count: 5,
            max: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("5 heading rows"));
        assert!(msg.contains("has 3"));
    }

    #[test]
    fn test_schema_violation_display() {
        let err = TableError::SchemaViolation {
            parent: NodeKind::TableCell,
            child: NodeKind::Table,
        };
        assert_eq!(err.to_string(), "table is not allowed inside tableCell");
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_invalid_input() {
        let err = TableError::invalid("bad cell reference");
        assert!(err.to_string().contains("bad cell reference"));
    }
}
