//! Helpers shared by commands and fixers

use crate::core::tree::{Document, NodeId, NodeKind, Position, Selection, Writer};
use crate::data::constants::{COLSPAN, DEFAULT_SPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};
use crate::utils::error::TableResult;

/// Heading row count of a table (0 when absent)
pub fn heading_rows(doc: &Document, table: NodeId) -> usize {
    doc.count_attribute(table, HEADING_ROWS).unwrap_or(0)
}

/// Heading column count of a table (0 when absent)
pub fn heading_columns(doc: &Document, table: NodeId) -> usize {
    doc.count_attribute(table, HEADING_COLUMNS).unwrap_or(0)
}

/// Create a detached cell holding one empty paragraph
pub fn create_cell(writer: &mut Writer<'_>, colspan: usize, rowspan: usize) -> TableResult<NodeId> {
    let cell = writer.create_element(NodeKind::TableCell);
    if colspan > DEFAULT_SPAN {
        writer.set_attribute(cell, COLSPAN, colspan)?;
    }
    if rowspan > DEFAULT_SPAN {
        writer.set_attribute(cell, ROWSPAN, rowspan)?;
    }
    let paragraph = writer.create_paragraph("");
    writer.append(paragraph, cell)?;
    Ok(cell)
}

/// Create a detached row holding `count` single cells
pub fn create_row(writer: &mut Writer<'_>, count: usize) -> TableResult<NodeId> {
    let row = writer.create_element(NodeKind::TableRow);
    for _ in 0..count {
        let cell = create_cell(writer, 1, 1)?;
        writer.append(cell, row)?;
    }
    Ok(row)
}

/// Set a span attribute, dropping it when it is 1
pub fn set_span(writer: &mut Writer<'_>, cell: NodeId, name: &str, value: usize) -> TableResult<()> {
    writer.set_count(cell, name, value.max(DEFAULT_SPAN), DEFAULT_SPAN)
}

/// Whether a cell holds nothing but (at most) one empty paragraph
pub fn is_empty_cell(doc: &Document, cell: NodeId) -> bool {
    let children = doc.children(cell);
    match children {
        [] => true,
        [only] => doc
            .get(*only)
            .map(|n| n.kind() == NodeKind::Paragraph && n.text().is_empty() && n.children().is_empty())
            .unwrap_or(false),
        _ => false,
    }
}

/// Table of a node, if the node is a table or inside one
pub fn table_of(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.ancestor(node, NodeKind::Table)
}

/// Paragraphs below `node`, in document order
pub fn paragraphs(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_paragraphs(doc, node, &mut out);
    out
}

fn collect_paragraphs(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
    if doc.kind(node) == Ok(NodeKind::Paragraph) {
        out.push(node);
        return;
    }
    for &child in doc.children(node) {
        collect_paragraphs(doc, child, out);
    }
}

/// Selection spanning the whole content of a cell
pub fn cell_content_selection(doc: &Document, cell: NodeId) -> Selection {
    let blocks = paragraphs(doc, cell);
    match (blocks.first(), blocks.last()) {
        (Some(&first), Some(&last)) => {
            let end = doc.get(last).map(|n| n.text().chars().count()).unwrap_or(0);
            Selection::range(Position::new(first, 0), Position::new(last, end))
        }
        _ => Selection::caret(cell, 0),
    }
}

/// Caret at the start of a cell's first paragraph
pub fn cell_start_selection(doc: &Document, cell: NodeId) -> Selection {
    let node = paragraphs(doc, cell).first().copied().unwrap_or(cell);
    Selection::caret(node, 0)
}
