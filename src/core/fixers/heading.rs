//! Keeps the heading attributes consistent with the grid

use super::PostFixer;
use crate::core::commands::split_heading_crossings;
use crate::core::table::TableGrid;
use crate::core::tree::{NodeId, Writer};
use crate::data::constants::{HEADING_COLUMNS, HEADING_ROWS};
use crate::utils::error::TableResult;

/// Clamps `headingRows`/`headingColumns` to the grid, drops explicit zeros,
/// and splits any span that crosses the heading boundary.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingFixer;

impl PostFixer for HeadingFixer {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn fix(&self, writer: &mut Writer<'_>, table: NodeId) -> TableResult<bool> {
        let before = writer.change_count();
        let grid = TableGrid::project(writer, table);

        for (name, limit) in [
            (HEADING_ROWS, grid.row_count()),
            (HEADING_COLUMNS, grid.column_count()),
        ] {
            let value = writer.attribute(table, name).map(|v| v.as_count());
            match value {
                Some(None) | Some(Some(0)) => writer.remove_attribute(table, name)?,
                Some(Some(n)) if n > limit => writer.set_count(table, name, limit, 0)?,
                _ => {}
            }
        }

        split_heading_crossings(writer, table)?;
        Ok(writer.change_count() > before)
    }
}
