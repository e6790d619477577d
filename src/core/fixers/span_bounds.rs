//! Keeps spans inside the table

use super::PostFixer;
use crate::core::table::{set_span, CellSlot, TableGrid, MAX_SPAN};
use crate::core::tree::{NodeId, Writer};
use crate::data::constants::{COLSPAN, ROWSPAN};
use crate::utils::error::TableResult;

/// Clamps spans to the table edges and to the slots a cell really owns.
///
/// - unreadable or zero span attributes are removed
/// - spans above [`MAX_SPAN`] are lowered to it
/// - a rowspan running past the last row is cut at the last row
/// - a cell that ran into an earlier cell shrinks to the rectangle it owns
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanBoundsFixer;

impl PostFixer for SpanBoundsFixer {
    fn name(&self) -> &'static str {
        "span-bounds"
    }

    fn fix(&self, writer: &mut Writer<'_>, table: NodeId) -> TableResult<bool> {
        let before = writer.change_count();
        let grid = TableGrid::project(writer, table);

        for cell in grid.cells() {
            for name in [COLSPAN, ROWSPAN] {
                let value = writer.attribute(cell.cell, name).map(|v| v.as_count());
                match value {
                    Some(None) | Some(Some(0)) => writer.remove_attribute(cell.cell, name)?,
                    Some(Some(n)) if n > MAX_SPAN => set_span(writer, cell.cell, name, MAX_SPAN)?,
                    _ => {}
                }
            }
        }

        for cell in grid.overflowing() {
            set_span(writer, cell.cell, ROWSPAN, cell.rowspan)?;
        }

        for cell in grid.overlapping() {
            let (rowspan, colspan) = owned_rectangle(&grid, cell);
            set_span(writer, cell.cell, COLSPAN, colspan)?;
            set_span(writer, cell.cell, ROWSPAN, rowspan)?;
        }

        Ok(writer.change_count() > before)
    }
}

/// Largest rectangle anchored at the cell's anchor whose slots all belong to it
fn owned_rectangle(grid: &TableGrid, cell: &CellSlot) -> (usize, usize) {
    let owns = |row: usize, column: usize| {
        grid.cell_at(row, column).map(|c| c.cell) == Some(cell.cell)
    };
    let colspan = (cell.column..cell.column_end())
        .take_while(|&column| owns(cell.row, column))
        .count()
        .max(1);
    let rowspan = (cell.row..cell.row_end())
        .take_while(|&row| (cell.column..cell.column + colspan).all(|column| owns(row, column)))
        .count()
        .max(1);
    (rowspan, colspan)
}
