//! Table, row and column insertion

use fxhash::FxHashSet;
use tracing::trace;

use super::{expect_table, CommandOutput};
use crate::core::table::{
    cell_start_selection, create_cell, create_row, heading_columns, heading_rows, set_span,
    TableGrid,
};
use crate::core::tree::{NodeId, NodeKind, Writer};
use crate::data::constants::{COLSPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};
use crate::utils::error::{TableError, TableResult};

/// Insert a fully formed table under the root and put the caret in its
/// first cell. Zero sizes fall back to the configured defaults.
pub fn insert_table(
    writer: &mut Writer<'_>,
    index: usize,
    rows: usize,
    columns: usize,
    heading_rows: usize,
    heading_columns: usize,
) -> TableResult<CommandOutput> {
    let root = writer.root();
    let len = writer.children(root).len();
    if index > len {
        return Err(TableError::out_of_range("table", index, len));
    }
    let rows = if rows == 0 { writer.options().default_rows.max(1) } else { rows };
    let columns = if columns == 0 {
        writer.options().default_columns.max(1)
    } else {
        columns
    };
    if heading_rows > rows {
        return Err(TableError::HeadingOutOfRange {
            what: "rows",
            count: heading_rows,
            max: rows,
        });
    }
    if heading_columns > columns {
        return Err(TableError::HeadingOutOfRange {
            what: "columns",
            count: heading_columns,
            max: columns,
        });
    }

    let table = writer.create_element(NodeKind::Table);
    writer.set_count(table, HEADING_ROWS, heading_rows, 0)?;
    writer.set_count(table, HEADING_COLUMNS, heading_columns, 0)?;
    for _ in 0..rows {
        let row = create_row(writer, columns)?;
        writer.append(row, table)?;
    }
    writer.insert(table, root, index)?;

    let first = writer
        .children(table)
        .first()
        .and_then(|&row| writer.children(row).first().copied());
    if let Some(cell) = first {
        let selection = cell_start_selection(writer, cell);
        writer.set_selection(selection);
    }
    trace!(table = %table, rows, columns, "inserted table");
    Ok(CommandOutput::with_cell(table, first))
}

/// Insert a row at `at`.
///
/// Cells whose rowspan crosses the insertion point grow by one row instead
/// of receiving a new cell. With `copy_structure_from`, the new cells mirror
/// the colspans of that row so merged column boundaries carry over.
pub fn insert_row(
    writer: &mut Writer<'_>,
    table: NodeId,
    at: usize,
    copy_structure_from: Option<usize>,
) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let grid = TableGrid::project(writer, table);
    if at > grid.row_count() {
        return Err(TableError::out_of_range("row", at, grid.row_count()));
    }
    if let Some(reference) = copy_structure_from {
        if reference >= grid.row_count() {
            return Err(TableError::out_of_range("row", reference, grid.row_count()));
        }
    }

    let columns = grid.column_count().max(1);
    let mut covered = vec![false; columns];
    let crossing: Vec<_> = grid
        .cells()
        .iter()
        .filter(|c| c.row < at && at < c.row_end())
        .cloned()
        .collect();
    for cell in &crossing {
        for flag in covered.iter_mut().take(cell.column_end()).skip(cell.column) {
            *flag = true;
        }
    }

    // Widths of the new cells, left to right
    let mut widths = Vec::new();
    let mut column = 0;
    while column < columns {
        if covered[column] {
            column += 1;
            continue;
        }
        let limit = copy_structure_from
            .and_then(|reference| grid.cell_at(reference, column))
            .map(|c| c.column_end())
            .unwrap_or(column + 1);
        let mut width = 1;
        while column + width < limit.min(columns) && !covered[column + width] {
            width += 1;
        }
        widths.push(width);
        column += width;
    }

    for cell in &crossing {
        set_span(writer, cell.cell, ROWSPAN, cell.rowspan + 1)?;
    }
    let row = writer.create_element(NodeKind::TableRow);
    for width in widths {
        let cell = create_cell(writer, width, 1)?;
        writer.append(cell, row)?;
    }
    writer.insert(row, table, at)?;

    let heading = heading_rows(writer, table);
    if at < heading {
        writer.set_attribute(table, HEADING_ROWS, heading + 1)?;
    }

    trace!(table = %table, at, grown = crossing.len(), "inserted row");
    let first = writer.children(row).first().copied();
    Ok(CommandOutput::with_cell(table, first))
}

/// Insert a column at `at`.
///
/// In each row, a cell whose colspan strictly contains the insertion point
/// grows by one column; every other row receives a new single cell.
pub fn insert_column(writer: &mut Writer<'_>, table: NodeId, at: usize) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let grid = TableGrid::project(writer, table);
    if at > grid.column_count() {
        return Err(TableError::out_of_range("column", at, grid.column_count()));
    }

    let mut grown: FxHashSet<NodeId> = FxHashSet::default();
    let mut first = None;
    for row in 0..grid.row_count() {
        if let Some(cell) = grid.cell_at(row, at) {
            if cell.column < at {
                if grown.insert(cell.cell) {
                    set_span(writer, cell.cell, COLSPAN, cell.colspan + 1)?;
                }
                continue;
            }
        }
        let index = grid.physical_index(row, at);
        let row_node = grid.rows()[row];
        let cell = create_cell(writer, 1, 1)?;
        writer.insert(cell, row_node, index)?;
        first.get_or_insert(cell);
    }

    let heading = heading_columns(writer, table);
    if at < heading {
        writer.set_attribute(table, HEADING_COLUMNS, heading + 1)?;
    }

    trace!(table = %table, at, grown = grown.len(), "inserted column");
    Ok(CommandOutput::with_cell(table, first))
}
