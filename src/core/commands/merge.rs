//! Cell merging

use fxhash::FxHashSet;
use tracing::trace;

use super::{locate_cell, CommandOutput, MergeDirection};
use crate::core::table::{
    cell_content_selection, heading_columns, heading_rows, is_empty_cell, set_span, table_of,
    CellSlot, TableGrid,
};
use crate::core::tree::{NodeId, NodeKind, Writer};
use crate::data::constants::{COLSPAN, ROWSPAN};
use crate::utils::error::{MergeFailure, TableError, TableResult};

fn refuse(failure: MergeFailure) -> TableError {
    TableError::MergeNotPossible(failure)
}

/// Merge two cells of the same table
pub fn merge_cells(writer: &mut Writer<'_>, first: NodeId, second: NodeId) -> TableResult<CommandOutput> {
    merge_range(writer, &[first, second])
}

/// Merge a cell with its neighbour in `direction`.
///
/// The neighbour must share the full edge: same rows for left/right, same
/// columns for up/down.
pub fn merge_cell(
    writer: &mut Writer<'_>,
    cell: NodeId,
    direction: MergeDirection,
) -> TableResult<CommandOutput> {
    let (table, slot) = locate_cell(writer, cell)?;
    let grid = TableGrid::project(writer, table);

    let neighbour = match direction {
        MergeDirection::Right => grid
            .cell_at(slot.row, slot.column_end())
            .filter(|n| n.row == slot.row && n.rowspan == slot.rowspan),
        MergeDirection::Left => slot
            .column
            .checked_sub(1)
            .and_then(|column| grid.cell_at(slot.row, column))
            .filter(|n| n.row == slot.row && n.rowspan == slot.rowspan),
        MergeDirection::Down => grid
            .cell_at(slot.row_end(), slot.column)
            .filter(|n| n.column == slot.column && n.colspan == slot.colspan),
        MergeDirection::Up => slot
            .row
            .checked_sub(1)
            .and_then(|row| grid.cell_at(row, slot.column))
            .filter(|n| n.column == slot.column && n.colspan == slot.colspan),
    };
    let neighbour = neighbour
        .map(|n| n.cell)
        .ok_or_else(|| refuse(MergeFailure::NoAdjacentCell))?;

    merge_range(writer, &[cell, neighbour])
}

/// Merge an arbitrary selection of cells.
///
/// The cells must tile their bounding box exactly. The top-left cell absorbs
/// the content of the others, in reading order, and grows to the bounding box.
pub fn merge_range(writer: &mut Writer<'_>, cells: &[NodeId]) -> TableResult<CommandOutput> {
    let mut unique: Vec<NodeId> = Vec::new();
    for &cell in cells {
        writer.expect_kind(cell, NodeKind::TableCell)?;
        if !unique.contains(&cell) {
            unique.push(cell);
        }
    }
    if unique.len() < 2 {
        return Err(refuse(MergeFailure::TooFewCells));
    }

    let table = table_of(writer, unique[0])
        .ok_or_else(|| TableError::invalid(format!("{} is not inside a table", unique[0])))?;
    if unique.iter().any(|&c| table_of(writer, c) != Some(table)) {
        return Err(refuse(MergeFailure::DifferentTables));
    }

    let grid = TableGrid::project(writer, table);
    let selected: FxHashSet<NodeId> = unique.iter().copied().collect();
    let mut slots: Vec<&CellSlot> = Vec::new();
    for &cell in &unique {
        let slot = grid
            .cell(cell)
            .ok_or_else(|| TableError::invalid(format!("{} is not placed on the grid", cell)))?;
        slots.push(slot);
    }

    let top = slots.iter().map(|c| c.row).min().unwrap_or(0);
    let left = slots.iter().map(|c| c.column).min().unwrap_or(0);
    let bottom = slots.iter().map(|c| c.row_end()).max().unwrap_or(0);
    let right = slots.iter().map(|c| c.column_end()).max().unwrap_or(0);

    let area: usize = slots.iter().map(|c| c.area()).sum();
    if area != (bottom - top) * (right - left) {
        return Err(refuse(MergeFailure::NotRectangular));
    }
    for row in top..bottom {
        for column in left..right {
            match grid.cell_at(row, column) {
                Some(c) if selected.contains(&c.cell) => {}
                _ => return Err(refuse(MergeFailure::NotRectangular)),
            }
        }
    }

    let crosses = |boundary: usize, start: usize, end: usize| start < boundary && boundary < end;
    if crosses(heading_rows(writer, table), top, bottom)
        || crosses(heading_columns(writer, table), left, right)
    {
        return Err(refuse(MergeFailure::CrossesHeading));
    }

    let target = grid
        .cell_at(top, left)
        .map(|c| c.cell)
        .ok_or_else(|| refuse(MergeFailure::NotRectangular))?;
    let mut absorbed: Vec<&CellSlot> = slots
        .into_iter()
        .filter(|c| c.cell != target)
        .collect();
    absorbed.sort_by_key(|c| grid.reading_index(c.cell));

    for cell in &absorbed {
        if !is_empty_cell(writer, cell.cell) {
            if is_empty_cell(writer, target) {
                for child in writer.children(target).to_vec() {
                    writer.remove(child)?;
                }
            }
            for child in writer.children(cell.cell).to_vec() {
                writer.move_node(child, target, usize::MAX)?;
            }
        }
        writer.remove(cell.cell)?;
    }
    set_span(writer, target, COLSPAN, right - left)?;
    set_span(writer, target, ROWSPAN, bottom - top)?;

    let selection = cell_content_selection(writer, target);
    writer.set_selection(selection);

    trace!(table = %table, cells = absorbed.len() + 1, "merged cells");
    Ok(CommandOutput::with_cell(table, Some(target)))
}
