//! Structural table commands
//!
//! Every mutator re-derives the grid from the tree, checks its preconditions
//! before the first edit, and then issues its edits through one [`Writer`].
//!
//! This module provides:
//! - Row and column insertion (with span growth and heading shifts)
//! - Row and column removal (with span shrinking and cell relocation)
//! - Cell merging and splitting
//! - Heading row/column changes
//!
//! # Architecture
//!
//! ```text
//! TableCommand -> Document::execute -> change(|writer| apply) -> post-fixers -> commit
//! ```
//!
//! The command set is closed: one variant per mutator.

mod heading;
mod insert;
mod merge;
mod remove;
mod split;


use tracing::debug;

use crate::core::table::{table_of, CellSlot, TableGrid};
use crate::core::tree::{Document, NodeId, NodeKind, Writer};
use crate::utils::error::{TableError, TableResult};

pub use heading::{set_heading_columns, set_heading_rows, split_heading_crossings};
pub use insert::{insert_column, insert_row, insert_table};
pub use merge::{merge_cell, merge_cells, merge_range};
pub use remove::{remove_columns, remove_rows};
pub use split::{split_at, split_cell};

/// Direction of the neighbour a cell is merged with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MergeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Axis along which a cell is split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SplitAxis {
    /// Split the columns of a cell (the new cell goes to the right)
    Vertical,
    /// Split the rows of a cell (the new cell goes below)
    Horizontal,
}

/// A structural table operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    InsertTable {
        /// Child index under the root
        index: usize,
        rows: usize,
        columns: usize,
        heading_rows: usize,
        heading_columns: usize,
    },
    InsertRow {
        table: NodeId,
        at: usize,
        copy_structure_from: Option<usize>,
    },
    InsertRowAbove {
        cell: NodeId,
    },
    InsertRowBelow {
        cell: NodeId,
    },
    InsertColumn {
        table: NodeId,
        at: usize,
    },
    InsertColumnLeft {
        cell: NodeId,
    },
    InsertColumnRight {
        cell: NodeId,
    },
    RemoveRows {
        table: NodeId,
        rows: Vec<usize>,
    },
    RemoveColumns {
        table: NodeId,
        columns: Vec<usize>,
    },
    MergeCells {
        first: NodeId,
        second: NodeId,
    },
    MergeCell {
        cell: NodeId,
        direction: MergeDirection,
    },
    MergeRange {
        cells: Vec<NodeId>,
    },
    SplitCell {
        cell: NodeId,
        axis: SplitAxis,
    },
    SetHeadingRows {
        table: NodeId,
        count: usize,
    },
    SetHeadingColumns {
        table: NodeId,
        count: usize,
    },
}

impl TableCommand {
    /// Command name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            TableCommand::InsertTable { .. } => "insertTable",
            TableCommand::InsertRow { .. } => "insertTableRow",
            TableCommand::InsertRowAbove { .. } => "insertTableRowAbove",
            TableCommand::InsertRowBelow { .. } => "insertTableRowBelow",
            TableCommand::InsertColumn { .. } => "insertTableColumn",
            TableCommand::InsertColumnLeft { .. } => "insertTableColumnLeft",
            TableCommand::InsertColumnRight { .. } => "insertTableColumnRight",
            TableCommand::RemoveRows { .. } => "removeTableRow",
            TableCommand::RemoveColumns { .. } => "removeTableColumn",
            TableCommand::MergeCells { .. } => "mergeTableCells",
            TableCommand::MergeCell { direction, .. } => match direction {
                MergeDirection::Up => "mergeTableCellUp",
                MergeDirection::Down => "mergeTableCellDown",
                MergeDirection::Left => "mergeTableCellLeft",
                MergeDirection::Right => "mergeTableCellRight",
            },
            TableCommand::MergeRange { .. } => "mergeTableCells",
            TableCommand::SplitCell { axis, .. } => match axis {
                SplitAxis::Vertical => "splitTableCellVertically",
                SplitAxis::Horizontal => "splitTableCellHorizontally",
            },
            TableCommand::SetHeadingRows { .. } => "setTableHeadingRows",
            TableCommand::SetHeadingColumns { .. } => "setTableHeadingColumns",
        }
    }
}

/// Result of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutput {
    /// The table acted on
    pub table: NodeId,
    /// The most relevant cell: new cell, merge target, or first cell of a new row
    pub cell: Option<NodeId>,
}

impl CommandOutput {
    pub(crate) fn with_cell(table: NodeId, cell: Option<NodeId>) -> Self {
        CommandOutput { table, cell }
    }
}

impl Document {
    /// Run a command as one transaction
    pub fn execute(&mut self, command: &TableCommand) -> TableResult<CommandOutput> {
        let result = self.change(|writer| apply(writer, command));
        match &result {
            Ok(output) => debug!(command = command.name(), table = %output.table, "command applied"),
            Err(err) => debug!(command = command.name(), error = %err, "command refused"),
        }
        result
    }
}

/// Apply a command inside an open transaction
pub fn apply(writer: &mut Writer<'_>, command: &TableCommand) -> TableResult<CommandOutput> {
    match command {
        TableCommand::InsertTable {
            index,
            rows,
            columns,
            heading_rows,
            heading_columns,
        } => insert_table(
            writer,
            *index,
            *rows,
            *columns,
            *heading_rows,
            *heading_columns,
        ),
        TableCommand::InsertRow {
            table,
            at,
            copy_structure_from,
        } => insert_row(writer, *table, *at, *copy_structure_from),
        TableCommand::InsertRowAbove { cell } => {
            let (table, slot) = locate_cell(writer, *cell)?;
            insert_row(writer, table, slot.row, Some(slot.row))
        }
        TableCommand::InsertRowBelow { cell } => {
            let (table, slot) = locate_cell(writer, *cell)?;
            insert_row(writer, table, slot.row_end(), Some(slot.row_end() - 1))
        }
        TableCommand::InsertColumn { table, at } => insert_column(writer, *table, *at),
        TableCommand::InsertColumnLeft { cell } => {
            let (table, slot) = locate_cell(writer, *cell)?;
            insert_column(writer, table, slot.column)
        }
        TableCommand::InsertColumnRight { cell } => {
            let (table, slot) = locate_cell(writer, *cell)?;
            insert_column(writer, table, slot.column_end())
        }
        TableCommand::RemoveRows { table, rows } => remove_rows(writer, *table, rows),
        TableCommand::RemoveColumns { table, columns } => remove_columns(writer, *table, columns),
        TableCommand::MergeCells { first, second } => merge_cells(writer, *first, *second),
        TableCommand::MergeCell { cell, direction } => merge_cell(writer, *cell, *direction),
        TableCommand::MergeRange { cells } => merge_range(writer, cells),
        TableCommand::SplitCell { cell, axis } => split_cell(writer, *cell, *axis),
        TableCommand::SetHeadingRows { table, count } => set_heading_rows(writer, *table, *count),
        TableCommand::SetHeadingColumns { table, count } => {
            set_heading_columns(writer, *table, *count)
        }
    }
}

/// Check that `table` is a table node
pub(crate) fn expect_table(doc: &Document, table: NodeId) -> TableResult<()> {
    doc.expect_kind(table, NodeKind::Table).map(|_| ())
}

/// Resolve a cell to its table and its placement on the grid
pub(crate) fn locate_cell(doc: &Document, cell: NodeId) -> TableResult<(NodeId, CellSlot)> {
    doc.expect_kind(cell, NodeKind::TableCell)?;
    let table = table_of(doc, cell).ok_or_else(|| {
        TableError::invalid(format!("{} is not inside a table", cell))
    })?;
    let grid = TableGrid::project(doc, table);
    let slot = grid
        .cell(cell)
        .cloned()
        .ok_or_else(|| TableError::invalid(format!("{} is not placed on the grid", cell)))?;
    Ok((table, slot))
}

/// Sorted, deduplicated indices; every index must be below `len`
pub(crate) fn normalize_indices(
    what: &'static str,
    indices: &[usize],
    len: usize,
) -> TableResult<Vec<usize>> {
    if indices.is_empty() {
        return Err(TableError::invalid(format!("no {} given", what)));
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if let Some(&index) = sorted.iter().find(|&&i| i >= len) {
        return Err(TableError::out_of_range(what, index, len));
    }
    Ok(sorted)
}
