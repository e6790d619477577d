//! Tab-style navigation between table cells
//!
//! Cells are visited in the grid's reading order, so merged cells are
//! visited once and rows fully covered by row spans are skipped. Moving
//! forward past the last cell appends a row; moving backward from the first
//! cell stays put.

use tracing::trace;

use crate::core::commands::insert_row;
use crate::core::table::{cell_content_selection, table_of, TableGrid};
use crate::core::tree::{Document, NodeId, NodeKind};
use crate::utils::error::TableResult;

/// Direction of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Outcome of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A selected table was entered at its first cell
    Entered(NodeId),
    /// The selection moved to another cell
    Moved(NodeId),
    /// A row was appended and the selection moved into its first cell
    Appended(NodeId),
    /// Backward from the first cell; nothing changed
    Stayed,
    /// The selection is not inside a table
    Ignored,
}

impl Navigation {
    /// The cell the selection ended up in, if it moved
    pub fn cell(&self) -> Option<NodeId> {
        match self {
            Navigation::Entered(cell) | Navigation::Moved(cell) | Navigation::Appended(cell) => {
                Some(*cell)
            }
            Navigation::Stayed | Navigation::Ignored => None,
        }
    }
}

/// Move the selection one cell in `direction`
pub fn navigate(doc: &mut Document, direction: Direction) -> TableResult<Navigation> {
    let selection = doc.selection();

    if let Some(table) = selection
        .selected_object()
        .filter(|&node| doc.kind(node) == Ok(NodeKind::Table))
    {
        let Some(first) = TableGrid::project(doc, table).reading_order().next() else {
            return Ok(Navigation::Ignored);
        };
        select(doc, first)?;
        trace!(table = %table, cell = %first, "entered table");
        return Ok(Navigation::Entered(first));
    }

    let Some(cell) = selection
        .focus_node()
        .and_then(|node| doc.ancestor(node, NodeKind::TableCell))
    else {
        return Ok(Navigation::Ignored);
    };
    let Some(table) = table_of(doc, cell) else {
        return Ok(Navigation::Ignored);
    };

    let grid = TableGrid::project(doc, table);
    let Some(index) = grid.reading_index(cell) else {
        return Ok(Navigation::Ignored);
    };

    match direction {
        Direction::Backward if index == 0 => Ok(Navigation::Stayed),
        Direction::Backward => {
            let target = grid.cells()[index - 1].cell;
            select(doc, target)?;
            Ok(Navigation::Moved(target))
        }
        Direction::Forward if index + 1 < grid.cells().len() => {
            let target = grid.cells()[index + 1].cell;
            select(doc, target)?;
            Ok(Navigation::Moved(target))
        }
        Direction::Forward => {
            let at = grid.row_count();
            let target = doc.change(|writer| {
                let output = insert_row(writer, table, at, at.checked_sub(1))?;
                if let Some(cell) = output.cell {
                    let selection = cell_content_selection(writer, cell);
                    writer.set_selection(selection);
                }
                Ok(output.cell)
            })?;
            trace!(table = %table, row = at, "appended row on forward navigation");
            Ok(target.map(Navigation::Appended).unwrap_or(Navigation::Stayed))
        }
    }
}

fn select(doc: &mut Document, cell: NodeId) -> TableResult<()> {
    let selection = cell_content_selection(doc, cell);
    doc.change(|writer| {
        writer.set_selection(selection);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{heading_rows, paragraphs};
    use crate::core::testing::{cell, put_caret, row_lengths, table, table_with_headings};
    use crate::core::tree::{Position, Selection};

    fn focus_cell(doc: &Document) -> Option<NodeId> {
        doc.selection()
            .focus_node()
            .and_then(|node| doc.ancestor(node, NodeKind::TableCell))
    }

    #[test]
    fn test_forward_moves_in_reading_order() {
        let mut doc = Document::new();
        let t = table(&mut doc, &[&["A", "B"], &["C", "D"]]);
        let target = cell(&doc, t, "A");
        put_caret(&mut doc, target);

        let b = cell(&doc, t, "B");
        assert_eq!(navigate(&mut doc, Direction::Forward).unwrap(), Navigation::Moved(b));

        // The whole content of the target cell is selected
        let paragraph = paragraphs(&doc, b)[0];
        assert_eq!(
            doc.selection(),
            Selection::range(Position::new(paragraph, 0), Position::new(paragraph, 1))
        );

        // End of a row continues on the next row
        let c = cell(&doc, t, "C");
        assert_eq!(navigate(&mut doc, Direction::Forward).unwrap(), Navigation::Moved(c));
    }

    #[test]
    fn test_backward() {
        let mut doc = Document::new();
        let t = table(&mut doc, &[&["A", "B"], &["C", "D"]]);
        let target = cell(&doc, t, "C");
        put_caret(&mut doc, target);

        let b = cell(&doc, t, "B");
        assert_eq!(navigate(&mut doc, Direction::Backward).unwrap(), Navigation::Moved(b));
        navigate(&mut doc, Direction::Backward).unwrap();

        let version = doc.version();
        assert_eq!(navigate(&mut doc, Direction::Backward).unwrap(), Navigation::Stayed);
        assert_eq!(doc.version(), version);
        assert_eq!(focus_cell(&doc), Some(cell(&doc, t, "A")));
    }

    #[test]
    fn test_forward_past_end_appends_row() {
        let mut doc = Document::new();
        let t = table_with_headings(&mut doc, &[&["H1", "H2"], &["A", "B"], &["C", "D"]], 1, 0);
        let target = cell(&doc, t, "D");
        put_caret(&mut doc, target);
        let version = doc.version();

        let result = navigate(&mut doc, Direction::Forward).unwrap();
        let Navigation::Appended(new_cell) = result else {
            panic!("expected a new row, got {result:?}");
        };

        assert_eq!(row_lengths(&doc, t), vec![2, 2, 2, 2]);
        assert_eq!(heading_rows(&doc, t), 1);
        let grid = TableGrid::project(&doc, t);
        assert_eq!(grid.cell(new_cell).map(|c| (c.row, c.column)), Some((3, 0)));
        assert_eq!(focus_cell(&doc), Some(new_cell));
        assert_eq!(doc.version(), version + 1);

        // Row and selection go away together
        doc.undo().unwrap();
        assert_eq!(row_lengths(&doc, t), vec![2, 2, 2]);
        assert_eq!(focus_cell(&doc), Some(cell(&doc, t, "D")));
    }

    #[test]
    fn test_appended_row_keeps_merged_columns() {
        let mut doc = Document::new();
        let t = table(&mut doc, &[&["A", "B"], &["C:c2"]]);
        let target = cell(&doc, t, "C");
        put_caret(&mut doc, target);

        let result = navigate(&mut doc, Direction::Forward).unwrap();
        let Navigation::Appended(new_cell) = result else {
            panic!("expected a new row, got {result:?}");
        };

        assert_eq!(row_lengths(&doc, t), vec![2, 1, 1]);
        let grid = TableGrid::project(&doc, t);
        assert_eq!(grid.cell(new_cell).map(|c| (c.row, c.colspan)), Some((2, 2)));
        assert!(grid.is_rectangular());
    }

    #[test]
    fn test_selected_table_is_entered() {
        let mut doc = Document::new();
        let t = table(&mut doc, &[&["A", "B"]]);
        doc.change(|w| {
            w.set_selection(Selection::Object(t));
            Ok(())
        })
        .unwrap();

        let a = cell(&doc, t, "A");
        assert_eq!(navigate(&mut doc, Direction::Backward).unwrap(), Navigation::Entered(a));
        assert_eq!(focus_cell(&doc), Some(a));
    }

    #[test]
    fn test_merged_cells_are_visited_once() {
        let mut doc = Document::new();
        let t = table(&mut doc, &[&["A:c2", "B"], &["C:r2", "D", "E"], &["F", "G"]]);
        let target = cell(&doc, t, "A");
        put_caret(&mut doc, target);

        let mut visited = Vec::new();
        for _ in 0..6 {
            let step = navigate(&mut doc, Direction::Forward).unwrap();
            visited.push(doc.text_content(step.cell().unwrap()));
        }
        assert_eq!(visited, vec!["B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn test_selection_outside_table_is_ignored() {
        let mut doc = Document::new();
        table(&mut doc, &[&["A"]]);
        doc.change(|w| {
            let p = w.create_paragraph("outside");
            let root = w.root();
            w.append(p, root)?;
            w.set_selection(Selection::caret(p, 0));
            Ok(())
        })
        .unwrap();

        assert_eq!(navigate(&mut doc, Direction::Forward).unwrap(), Navigation::Ignored);

        doc.change(|w| {
            w.set_selection(Selection::None);
            Ok(())
        })
        .unwrap();
        assert_eq!(navigate(&mut doc, Direction::Forward).unwrap(), Navigation::Ignored);
    }
}
