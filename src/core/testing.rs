//! Test support: compact table builders
//!
//! Cells are written as `"text"` or `"text:c2r3"` where `c` is the colspan
//! and `r` the rowspan.

use crate::core::table::TableGrid;
use crate::core::tree::{Document, NodeId, NodeKind};
use crate::data::constants::{COLSPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};

fn parse_cell(entry: &str) -> (&str, usize, usize) {
    let Some((text, spans)) = entry.rsplit_once(':') else {
        return (entry, 1, 1);
    };
    let mut colspan = 1;
    let mut rowspan = 1;
    let mut chars = spans.chars().peekable();
    while let Some(axis) = chars.next() {
        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|c| c.is_ascii_digit()) {
            digits.push(*d);
            chars.next();
        }
        let value = digits.parse().unwrap();
        match axis {
            'c' => colspan = value,
            'r' => rowspan = value,
            other => panic!("unknown span axis {other}"),
        }
    }
    (text, colspan, rowspan)
}

/// Build a table under the root in one transaction
pub(crate) fn table(doc: &mut Document, rows: &[&[&str]]) -> NodeId {
    table_with_headings(doc, rows, 0, 0)
}

/// Build a table with heading attributes in one transaction
pub(crate) fn table_with_headings(
    doc: &mut Document,
    rows: &[&[&str]],
    heading_rows: usize,
    heading_columns: usize,
) -> NodeId {
    doc.change(|w| {
        let table = w.create_element(NodeKind::Table);
        if heading_rows > 0 {
            w.set_attribute(table, HEADING_ROWS, heading_rows)?;
        }
        if heading_columns > 0 {
            w.set_attribute(table, HEADING_COLUMNS, heading_columns)?;
        }
        for row in rows {
            let row_node = w.create_element(NodeKind::TableRow);
            for entry in row.iter() {
                let (text, colspan, rowspan) = parse_cell(entry);
                let cell = w.create_element(NodeKind::TableCell);
                if colspan != 1 {
                    w.set_attribute(cell, COLSPAN, colspan)?;
                }
                if rowspan != 1 {
                    w.set_attribute(cell, ROWSPAN, rowspan)?;
                }
                let paragraph = w.create_paragraph(text);
                w.append(paragraph, cell)?;
                w.append(cell, row_node)?;
            }
            w.append(row_node, table)?;
        }
        let root = w.root();
        w.append(table, root)?;
        Ok(table)
    })
    .unwrap()
}

/// Slot texts of a table
pub(crate) fn layout(doc: &Document, table: NodeId) -> Vec<Vec<String>> {
    TableGrid::project(doc, table).layout(doc)
}

/// Expected layout literal
pub(crate) fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// Cell whose text content equals `text`
pub(crate) fn cell(doc: &Document, table: NodeId, text: &str) -> NodeId {
    TableGrid::project(doc, table)
        .cells()
        .iter()
        .find(|c| doc.text_content(c.cell) == text)
        .map(|c| c.cell)
        .unwrap_or_else(|| panic!("no cell with text {text:?}"))
}

/// Number of physical cells per row
pub(crate) fn row_lengths(doc: &Document, table: NodeId) -> Vec<usize> {
    doc.children(table)
        .iter()
        .map(|&row| doc.children(row).len())
        .collect()
}

/// Put the caret at the start of a cell
pub(crate) fn put_caret(doc: &mut Document, cell: NodeId) {
    let selection = crate::core::table::cell_start_selection(doc, cell);
    doc.change(|w| {
        w.set_selection(selection);
        Ok(())
    })
    .unwrap();
}
