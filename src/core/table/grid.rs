//! Logical grid projection
//!
//! Projects the physical row/cell tree of a table onto its logical grid.
//! Rows are walked top to bottom; in each row the physical cells are placed
//! left to right at the first column not already covered by a span from a
//! previous row.

use fxhash::FxHashMap;

use crate::core::tree::{Document, NodeId, NodeKind};
use crate::data::constants::{COLSPAN, DEFAULT_SPAN, ROWSPAN};

/// Largest span value the projection honours
pub const MAX_SPAN: usize = 1000;

/// A cell placed on the logical grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSlot {
    /// The cell node
    pub cell: NodeId,
    /// Anchor row
    pub row: usize,
    /// Anchor column
    pub column: usize,
    /// Rows covered, clipped to the bottom edge
    pub rowspan: usize,
    /// Columns covered
    pub colspan: usize,
    /// Rowspan as read from the attribute, before clipping
    pub declared_rowspan: usize,
    /// Physical index of the cell inside its row
    pub index: usize,
}

impl CellSlot {
    /// First row below the cell
    pub fn row_end(&self) -> usize {
        self.row + self.rowspan
    }

    /// First column right of the cell
    pub fn column_end(&self) -> usize {
        self.column + self.colspan
    }

    pub fn area(&self) -> usize {
        self.rowspan * self.colspan
    }
}

/// Occupant of one logical slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'g> {
    pub cell: &'g CellSlot,
    /// Whether this slot is the cell's top-left slot
    pub is_anchor: bool,
}

/// Read a span attribute leniently: missing, zero or unparsable means 1
pub fn read_span(doc: &Document, cell: NodeId, name: &str) -> usize {
    doc.count_attribute(cell, name)
        .filter(|&n| n >= 1)
        .map(|n| n.min(MAX_SPAN))
        .unwrap_or(DEFAULT_SPAN)
}

/// The logical grid of one table
#[derive(Debug, Clone)]
pub struct TableGrid {
    table: NodeId,
    rows: Vec<NodeId>,
    columns: usize,
    cells: Vec<CellSlot>,
    slots: Vec<Vec<Option<usize>>>,
    by_node: FxHashMap<NodeId, usize>,
    overlaps: Vec<usize>,
}

impl TableGrid {
    /// Project a table. Never mutates the tree.
    pub fn project(doc: &Document, table: NodeId) -> TableGrid {
        let rows: Vec<NodeId> = doc
            .children(table)
            .iter()
            .copied()
            .filter(|&id| doc.kind(id) == Ok(NodeKind::TableRow))
            .collect();
        let row_count = rows.len();

        let mut slots: Vec<Vec<Option<usize>>> = vec![Vec::new(); row_count];
        let mut cells = Vec::new();
        let mut by_node = FxHashMap::default();
        let mut overlaps = Vec::new();

        for (row, &row_node) in rows.iter().enumerate() {
            let mut column = 0;

            for (index, &cell) in doc.children(row_node).iter().enumerate() {
                // Skip columns covered by spans from previous rows
                while slots[row].get(column).copied().flatten().is_some() {
                    column += 1;
                }

                let colspan = read_span(doc, cell, COLSPAN);
                let declared_rowspan = read_span(doc, cell, ROWSPAN);
                let rowspan = declared_rowspan.min(row_count - row);
                let id = cells.len();

                let mut overlapped = false;
                for row_slots in slots.iter_mut().skip(row).take(rowspan) {
                    if row_slots.len() < column + colspan {
                        row_slots.resize(column + colspan, None);
                    }
                    for slot in &mut row_slots[column..column + colspan] {
                        if slot.is_some() {
                            overlapped = true;
                        } else {
                            *slot = Some(id);
                        }
                    }
                }
                if overlapped {
                    overlaps.push(id);
                }

                cells.push(CellSlot {
                    cell,
                    row,
                    column,
                    rowspan,
                    colspan,
                    declared_rowspan,
                    index,
                });
                by_node.insert(cell, id);
                column += colspan;
            }
        }

        let columns = slots.iter().map(Vec::len).max().unwrap_or(0);
        for row_slots in &mut slots {
            row_slots.resize(columns, None);
        }

        TableGrid {
            table,
            rows,
            columns,
            cells,
            slots,
            by_node,
            overlaps,
        }
    }

    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Row nodes, top to bottom
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn row_node(&self, row: usize) -> Option<NodeId> {
        self.rows.get(row).copied()
    }

    /// Every cell in reading order (row by row, physical order within a row)
    pub fn cells(&self) -> &[CellSlot] {
        &self.cells
    }

    /// Cells anchored in `row`
    pub fn cells_in_row(&self, row: usize) -> impl Iterator<Item = &CellSlot> + '_ {
        self.cells.iter().filter(move |c| c.row == row)
    }

    pub fn cell(&self, node: NodeId) -> Option<&CellSlot> {
        self.by_node.get(&node).map(|&i| &self.cells[i])
    }

    /// Cell nodes in reading order
    pub fn reading_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.cells.iter().map(|c| c.cell)
    }

    /// Position of a cell in reading order
    pub fn reading_index(&self, node: NodeId) -> Option<usize> {
        self.by_node.get(&node).copied()
    }

    pub fn slot(&self, row: usize, column: usize) -> Option<Slot<'_>> {
        let id = (*self.slots.get(row)?.get(column)?)?;
        let cell = &self.cells[id];
        Some(Slot {
            cell,
            is_anchor: cell.row == row && cell.column == column,
        })
    }

    pub fn cell_at(&self, row: usize, column: usize) -> Option<&CellSlot> {
        self.slot(row, column).map(|s| s.cell)
    }

    /// Number of slots in `row` covered by some cell
    pub fn row_width(&self, row: usize) -> usize {
        self.slots
            .get(row)
            .map(|r| r.iter().filter(|s| s.is_some()).count())
            .unwrap_or(0)
    }

    /// Number of uncovered slots in the grid
    pub fn hole_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.is_none())
            .count()
    }

    /// Cells whose declared rectangle ran into an earlier cell
    pub fn overlapping(&self) -> impl Iterator<Item = &CellSlot> + '_ {
        self.overlaps.iter().map(|&i| &self.cells[i])
    }

    /// Cells whose declared rowspan runs past the bottom edge
    pub fn overflowing(&self) -> impl Iterator<Item = &CellSlot> + '_ {
        self.cells
            .iter()
            .filter(|c| c.declared_rowspan > c.rowspan)
    }

    /// Whether every slot is covered exactly once and no span leaves the table
    pub fn is_rectangular(&self) -> bool {
        self.hole_count() == 0 && self.overlaps.is_empty() && self.overflowing().next().is_none()
    }

    /// Child index at which a cell anchored at `column` belongs in `row`
    pub fn physical_index(&self, row: usize, column: usize) -> usize {
        self.cells_in_row(row).filter(|c| c.column < column).count()
    }

    /// Text of the cell covering each slot (empty string for holes)
    pub fn layout(&self, doc: &Document) -> Vec<Vec<String>> {
        (0..self.row_count())
            .map(|row| {
                (0..self.columns)
                    .map(|column| {
                        self.cell_at(row, column)
                            .map(|c| doc.text_content(c.cell))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    /// Span structure as `(row, column, rowspan, colspan)` per cell, in reading order
    pub fn shape(&self) -> Vec<(usize, usize, usize, usize)> {
        self.cells
            .iter()
            .map(|c| (c.row, c.column, c.rowspan, c.colspan))
            .collect()
    }
}
