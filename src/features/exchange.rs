//! Exchange format for tables
//!
//! A table is exchanged as
//!
//! ```json
//! { "headingRows": 1, "headingColumns": 0,
//!   "rows": [ { "cells": [ { "colspan": 2, "content": ["text"] } ] } ] }
//! ```
//!
//! Spans equal to 1 and zero heading counts are omitted. The data mirrors the
//! physical tree: one entry per row node and per cell node, so a table read
//! back in projects onto the same logical grid.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::table::{heading_columns, heading_rows, read_span};
use crate::core::tree::{Document, NodeId, NodeKind, Selection, Writer};
use crate::data::constants::{COLSPAN, DEFAULT_SPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};
use crate::utils::error::{TableError, TableResult};

/// A table in exchange form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TableData {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_zero"))]
    pub heading_rows: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_zero"))]
    pub heading_columns: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rows: Vec<RowData>,
}

/// One physical row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RowData {
    #[cfg_attr(feature = "serde", serde(default))]
    pub cells: Vec<CellData>,
}

/// One cell: spans plus the text of each content block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellData {
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_span", skip_serializing_if = "is_default_span")
    )]
    pub colspan: usize,
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_span", skip_serializing_if = "is_default_span")
    )]
    pub rowspan: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: Vec<String>,
}

#[cfg(feature = "serde")]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[cfg(feature = "serde")]
fn default_span() -> usize {
    DEFAULT_SPAN
}

#[cfg(feature = "serde")]
fn is_default_span(n: &usize) -> bool {
    *n == DEFAULT_SPAN
}

impl CellData {
    /// A 1×1 cell with one paragraph
    pub fn new(text: impl Into<String>) -> Self {
        CellData {
            colspan: DEFAULT_SPAN,
            rowspan: DEFAULT_SPAN,
            content: vec![text.into()],
        }
    }

    /// A cell with explicit spans
    pub fn with_spans(text: impl Into<String>, colspan: usize, rowspan: usize) -> Self {
        CellData {
            colspan,
            rowspan,
            content: vec![text.into()],
        }
    }

    /// All blocks joined with newlines
    pub fn text(&self) -> String {
        self.content.join("\n")
    }
}

impl Default for CellData {
    fn default() -> Self {
        CellData {
            colspan: DEFAULT_SPAN,
            rowspan: DEFAULT_SPAN,
            content: Vec::new(),
        }
    }
}

impl TableData {
    /// Table of single-paragraph, unmerged cells
    pub fn from_texts(rows: &[&[&str]]) -> Self {
        TableData {
            heading_rows: 0,
            heading_columns: 0,
            rows: rows
                .iter()
                .map(|row| RowData {
                    cells: row.iter().map(|&text| CellData::new(text)).collect(),
                })
                .collect(),
        }
    }

    /// Read a table out of the document
    pub fn from_table(doc: &Document, table: NodeId) -> TableResult<Self> {
        doc.expect_kind(table, NodeKind::Table)?;

        let rows = doc
            .children(table)
            .iter()
            .map(|&row| RowData {
                cells: doc
                    .children(row)
                    .iter()
                    .map(|&cell| CellData {
                        colspan: read_span(doc, cell, COLSPAN),
                        rowspan: read_span(doc, cell, ROWSPAN),
                        content: doc.block_texts(cell),
                    })
                    .collect(),
            })
            .collect();

        Ok(TableData {
            heading_rows: heading_rows(doc, table),
            heading_columns: heading_columns(doc, table),
            rows,
        })
    }

    /// Insert the table as child `index` of the root.
    ///
    /// Values are written as given; a malformed table is repaired by the
    /// post-fixers when the transaction commits, like any pasted content.
    pub fn insert_into(&self, doc: &mut Document, index: usize) -> TableResult<NodeId> {
        let table = doc.change(|writer| {
            let root = writer.root();
            let len = writer.children(root).len();
            if index > len {
                return Err(TableError::out_of_range("block", index, len));
            }

            let table = self.build(writer)?;
            writer.insert(table, root, index)?;
            Ok(table)
        })?;
        debug!(table = %table, rows = self.rows.len(), "inserted exchanged table");
        Ok(table)
    }

    /// Replace an existing table with this data, keeping its position
    pub fn replace(&self, doc: &mut Document, table: NodeId) -> TableResult<NodeId> {
        doc.expect_kind(table, NodeKind::Table)?;
        doc.change(|writer| {
            let root = writer.root();
            let index = writer
                .index_of(table)
                .ok_or_else(|| TableError::invalid(format!("table {table} is not attached")))?;
            writer.remove(table)?;
            let replacement = self.build(writer)?;
            writer.insert(replacement, root, index)?;
            writer.set_selection(Selection::None);
            Ok(replacement)
        })
    }

    /// Build the detached table node
    fn build(&self, writer: &mut Writer<'_>) -> TableResult<NodeId> {
        let table = writer.create_element(NodeKind::Table);
        if self.heading_rows > 0 {
            writer.set_attribute(table, HEADING_ROWS, self.heading_rows)?;
        }
        if self.heading_columns > 0 {
            writer.set_attribute(table, HEADING_COLUMNS, self.heading_columns)?;
        }

        for row in &self.rows {
            let row_node = writer.create_element(NodeKind::TableRow);
            for cell in &row.cells {
                let cell_node = writer.create_element(NodeKind::TableCell);
                if cell.colspan != DEFAULT_SPAN {
                    writer.set_attribute(cell_node, COLSPAN, cell.colspan)?;
                }
                if cell.rowspan != DEFAULT_SPAN {
                    writer.set_attribute(cell_node, ROWSPAN, cell.rowspan)?;
                }
                for text in &cell.content {
                    let paragraph = writer.create_paragraph(text.as_str());
                    writer.append(paragraph, cell_node)?;
                }
                writer.append(cell_node, row_node)?;
            }
            writer.append(row_node, table)?;
        }
        Ok(table)
    }

    /// Cells in physical order
    pub fn cells(&self) -> impl Iterator<Item = &CellData> + '_ {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }
}

#[cfg(feature = "serde")]
impl TableData {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> TableResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json(input: &str) -> TableResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}
