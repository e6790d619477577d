//! Heading rows and columns

use tracing::trace;

use super::{expect_table, split_at, CommandOutput, SplitAxis};
use crate::core::table::{heading_columns, heading_rows, TableGrid};
use crate::core::tree::{NodeId, Writer};
use crate::data::constants::{HEADING_COLUMNS, HEADING_ROWS};
use crate::utils::error::{TableError, TableResult};

/// Set the number of heading rows, splitting row spans that would cross
/// the new boundary
pub fn set_heading_rows(writer: &mut Writer<'_>, table: NodeId, count: usize) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let rows = TableGrid::project(writer, table).row_count();
    if count > rows {
        return Err(TableError::HeadingOutOfRange {
            what: "rows",
            count,
            max: rows,
        });
    }
    writer.set_count(table, HEADING_ROWS, count, 0)?;
    split_heading_crossings(writer, table)?;
    Ok(CommandOutput::with_cell(table, None))
}

/// Set the number of heading columns, splitting column spans that would
/// cross the new boundary
pub fn set_heading_columns(
    writer: &mut Writer<'_>,
    table: NodeId,
    count: usize,
) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let columns = TableGrid::project(writer, table).column_count();
    if count > columns {
        return Err(TableError::HeadingOutOfRange {
            what: "columns",
            count,
            max: columns,
        });
    }
    writer.set_count(table, HEADING_COLUMNS, count, 0)?;
    split_heading_crossings(writer, table)?;
    Ok(CommandOutput::with_cell(table, None))
}

/// Split every cell whose span crosses the heading boundary at the boundary.
/// Returns the number of splits made.
pub fn split_heading_crossings(writer: &mut Writer<'_>, table: NodeId) -> TableResult<usize> {
    let mut splits = 0;
    loop {
        let grid = TableGrid::project(writer, table);
        let rows = heading_rows(writer, table);
        let columns = heading_columns(writer, table);

        let crossing = grid.cells().iter().find_map(|cell| {
            if cell.row < rows && rows < cell.row_end() {
                Some((cell.clone(), SplitAxis::Horizontal, rows - cell.row))
            } else if cell.column < columns && columns < cell.column_end() {
                Some((cell.clone(), SplitAxis::Vertical, columns - cell.column))
            } else {
                None
            }
        });
        let Some((cell, axis, offset)) = crossing else {
            break;
        };
        split_at(writer, &grid, &cell, axis, offset)?;
        splits += 1;
    }
    if splits > 0 {
        trace!(table = %table, splits, "split cells at the heading boundary");
    }
    Ok(splits)
}
