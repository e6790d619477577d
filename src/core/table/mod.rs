//! Table Grid Model
//!
//! A pure projection of a table's physical row/cell tree onto its logical
//! rectangle of slots.
//!
//! This module provides:
//! - `rowspan` and `colspan` placement across rows
//! - Slot lookup with anchor detection
//! - Detection of holes, overlaps and spans leaving the table
//!
//! # Architecture
//!
//! The grid is never cached: every consumer re-derives it from the tree, so
//! it cannot drift out of sync with the document.
//!
//! ```text
//! Table node -> rows -> cells (physical order) -> coverage walk -> TableGrid
//! ```
//!
//! # Example
//!
//! ```ignore
//! let grid = TableGrid::project(&doc, table);
//! let slot = grid.slot(1, 2).unwrap();
//! assert!(!slot.is_anchor);
//! ```

mod grid;
mod utils;


// Re-export public API
pub use grid::{read_span, CellSlot, Slot, TableGrid, MAX_SPAN};
pub use utils::{
    cell_content_selection, cell_start_selection, create_cell, create_row, heading_columns,
    heading_rows, is_empty_cell, paragraphs, set_span, table_of,
};
