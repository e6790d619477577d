//! Row and column removal

use tracing::trace;

use super::{expect_table, normalize_indices, CommandOutput};
use crate::core::table::{
    cell_start_selection, heading_columns, heading_rows, set_span, TableGrid,
};
use crate::core::tree::{NodeId, NodeKind, Writer};
use crate::data::constants::{COLSPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};
use crate::utils::error::{TableError, TableResult};

/// Grid position of the selection focus, when its cell is about to disappear
fn doomed_focus(
    writer: &Writer<'_>,
    grid: &TableGrid,
    doomed: impl Fn(NodeId) -> bool,
) -> Option<(usize, usize)> {
    let focus = writer.selection().focus_node()?;
    let cell = writer.ancestor(focus, NodeKind::TableCell)?;
    let slot = grid.cell(cell)?;
    doomed(cell).then_some((slot.row, slot.column))
}

/// Put the caret into the cell now covering `(row, column)`, clamped to the grid
fn reselect(writer: &mut Writer<'_>, table: NodeId, row: usize, column: usize) {
    let grid = TableGrid::project(writer, table);
    if grid.row_count() == 0 || grid.column_count() == 0 {
        return;
    }
    let row = row.min(grid.row_count() - 1);
    let column = column.min(grid.column_count() - 1);
    if let Some(cell) = grid.cell_at(row, column).map(|c| c.cell) {
        let selection = cell_start_selection(writer, cell);
        writer.set_selection(selection);
    }
}

/// Remove the given rows.
///
/// Cells spanning into removed rows lose the removed rows from their rowspan.
/// A cell anchored in a removed row that still reaches a surviving row moves
/// down to the first surviving row of its span.
pub fn remove_rows(writer: &mut Writer<'_>, table: NodeId, rows: &[usize]) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let grid = TableGrid::project(writer, table);
    let removed = normalize_indices("row", rows, grid.row_count())?;
    if removed.len() == grid.row_count() {
        return Err(TableError::RemovesEverything { what: "row" });
    }
    let is_removed = |row: usize| removed.binary_search(&row).is_ok();

    let mut shrink = Vec::new();
    // (target row, column, cell, physical index in target row)
    let mut moves: Vec<(usize, usize, NodeId, usize)> = Vec::new();
    let mut deleted = Vec::new();
    for cell in grid.cells() {
        let hit = (cell.row..cell.row_end()).filter(|&r| is_removed(r)).count();
        if hit == 0 {
            continue;
        }
        if hit == cell.rowspan {
            deleted.push(cell.cell);
            continue;
        }
        shrink.push((cell.cell, cell.rowspan - hit));
        if is_removed(cell.row) {
            if let Some(target) = (cell.row..cell.row_end()).find(|&r| !is_removed(r)) {
                let index = grid.physical_index(target, cell.column);
                moves.push((target, cell.column, cell.cell, index));
            }
        }
    }
    let focus = doomed_focus(writer, &grid, |cell| deleted.contains(&cell));

    for &(cell, rowspan) in &shrink {
        set_span(writer, cell, ROWSPAN, rowspan)?;
    }
    moves.sort_by_key(|&(row, column, _, _)| (row, column));
    let mut previous_row = None;
    let mut moved_into_row = 0;
    for &(row, _, cell, index) in &moves {
        if previous_row != Some(row) {
            previous_row = Some(row);
            moved_into_row = 0;
        }
        writer.move_node(cell, grid.rows()[row], index + moved_into_row)?;
        moved_into_row += 1;
    }
    for &row in removed.iter().rev() {
        writer.remove(grid.rows()[row])?;
    }

    let heading = heading_rows(writer, table);
    let inside = removed.iter().filter(|&&r| r < heading).count();
    if inside > 0 {
        writer.set_count(table, HEADING_ROWS, heading - inside, 0)?;
    }

    if let Some((row, column)) = focus {
        let surviving_above = (0..row).filter(|&r| !is_removed(r)).count();
        reselect(writer, table, surviving_above, column);
    }

    trace!(table = %table, rows = removed.len(), moved = moves.len(), "removed rows");
    Ok(CommandOutput::with_cell(table, None))
}

/// Remove the given columns.
///
/// Cells spanning into removed columns lose the removed columns from their
/// colspan; a cell covering only removed columns is deleted.
pub fn remove_columns(
    writer: &mut Writer<'_>,
    table: NodeId,
    columns: &[usize],
) -> TableResult<CommandOutput> {
    expect_table(writer, table)?;
    let grid = TableGrid::project(writer, table);
    let removed = normalize_indices("column", columns, grid.column_count())?;
    if removed.len() == grid.column_count() {
        return Err(TableError::RemovesEverything { what: "column" });
    }
    let is_removed = |column: usize| removed.binary_search(&column).is_ok();

    let mut shrink = Vec::new();
    let mut deleted = Vec::new();
    for cell in grid.cells() {
        let hit = (cell.column..cell.column_end())
            .filter(|&c| is_removed(c))
            .count();
        if hit == 0 {
            continue;
        }
        if hit == cell.colspan {
            deleted.push(cell.cell);
        } else {
            shrink.push((cell.cell, cell.colspan - hit));
        }
    }
    let focus = doomed_focus(writer, &grid, |cell| deleted.contains(&cell));

    for &(cell, colspan) in &shrink {
        set_span(writer, cell, COLSPAN, colspan)?;
    }
    for &cell in &deleted {
        writer.remove(cell)?;
    }

    let heading = heading_columns(writer, table);
    let inside = removed.iter().filter(|&&c| c < heading).count();
    if inside > 0 {
        writer.set_count(table, HEADING_COLUMNS, heading - inside, 0)?;
    }

    if let Some((row, column)) = focus {
        let surviving_left = (0..column).filter(|&c| !is_removed(c)).count();
        reselect(writer, table, row, surviving_left);
    }

    trace!(table = %table, columns = removed.len(), deleted = deleted.len(), "removed columns");
    Ok(CommandOutput::with_cell(table, None))
}
