//! Cell splitting

use tracing::trace;

use super::{locate_cell, CommandOutput, SplitAxis};
use crate::core::table::{create_cell, set_span, CellSlot, TableGrid};
use crate::core::tree::{NodeId, Writer};
use crate::data::constants::{COLSPAN, ROWSPAN};
use crate::utils::error::{SplitFailure, TableError, TableResult};

/// Split a spanning cell in half along `axis`.
///
/// The original cell keeps its content and the first `floor(span / 2)`
/// rows or columns; the new cell takes the rest and starts with one empty
/// paragraph.
pub fn split_cell(writer: &mut Writer<'_>, cell: NodeId, axis: SplitAxis) -> TableResult<CommandOutput> {
    let (table, slot) = locate_cell(writer, cell)?;
    let span = match axis {
        SplitAxis::Vertical if slot.colspan < 2 => {
            return Err(TableError::SplitNotPossible(SplitFailure::SingleColumn))
        }
        SplitAxis::Horizontal if slot.rowspan < 2 => {
            return Err(TableError::SplitNotPossible(SplitFailure::SingleRow))
        }
        SplitAxis::Vertical => slot.colspan,
        SplitAxis::Horizontal => slot.rowspan,
    };
    let grid = TableGrid::project(writer, table);
    let new_cell = split_at(writer, &grid, &slot, axis, span / 2)?;
    Ok(CommandOutput::with_cell(table, Some(new_cell)))
}

/// Cut a cell so that it keeps `offset` rows or columns; the remainder goes
/// to a new empty cell placed right after it (vertical) or below it
/// (horizontal). Returns the new cell.
pub fn split_at(
    writer: &mut Writer<'_>,
    grid: &TableGrid,
    slot: &CellSlot,
    axis: SplitAxis,
    offset: usize,
) -> TableResult<NodeId> {
    let span = match axis {
        SplitAxis::Vertical => slot.colspan,
        SplitAxis::Horizontal => slot.rowspan,
    };
    if offset == 0 || offset >= span {
        return Err(TableError::SplitNotPossible(SplitFailure::OffsetOutOfRange));
    }

    let (row, index, new_cell) = match axis {
        SplitAxis::Vertical => {
            let new_cell = create_cell(writer, slot.colspan - offset, slot.rowspan)?;
            set_span(writer, slot.cell, COLSPAN, offset)?;
            (slot.row, slot.index + 1, new_cell)
        }
        SplitAxis::Horizontal => {
            let new_cell = create_cell(writer, slot.colspan, slot.rowspan - offset)?;
            set_span(writer, slot.cell, ROWSPAN, offset)?;
            let row = slot.row + offset;
            (row, grid.physical_index(row, slot.column), new_cell)
        }
    };
    let row_node = grid
        .row_node(row)
        .ok_or_else(|| TableError::out_of_range("row", row, grid.row_count()))?;
    writer.insert(new_cell, row_node, index)?;

    trace!(cell = %slot.cell, new_cell = %new_cell, offset, ?axis, "split cell");
    Ok(new_cell)
}
