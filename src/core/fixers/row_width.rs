//! Pads rows that are narrower than the table

use super::PostFixer;
use crate::core::table::{create_cell, create_row, TableGrid};
use crate::core::tree::{NodeId, Writer};
use crate::utils::error::TableResult;

/// Appends single cells to every row narrower than the widest row.
///
/// The grid only ever grows here; content is never dropped to make rows fit.
#[derive(Debug, Default, Clone, Copy)]
pub struct RowWidthFixer;

impl PostFixer for RowWidthFixer {
    fn name(&self) -> &'static str {
        "row-width"
    }

    fn fix(&self, writer: &mut Writer<'_>, table: NodeId) -> TableResult<bool> {
        let grid = TableGrid::project(writer, table);

        if grid.row_count() == 0 {
            let row = create_row(writer, 1)?;
            writer.append(row, table)?;
            return Ok(true);
        }
        if grid.column_count() == 0 {
            let cell = create_cell(writer, 1, 1)?;
            writer.append(cell, grid.rows()[0])?;
            return Ok(true);
        }

        let before = writer.change_count();
        for (row, &row_node) in grid.rows().iter().enumerate() {
            let missing = grid.column_count() - grid.row_width(row);
            for _ in 0..missing {
                let cell = create_cell(writer, 1, 1)?;
                writer.append(cell, row_node)?;
            }
        }
        Ok(writer.change_count() > before)
    }
}
