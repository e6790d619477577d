//! # tablegrid
//!
//! Structural table engine for tree-shaped rich documents.
//!
//! A table is stored as a tree (`table > row > cell > paragraph`) where cells
//! may carry `colspan`/`rowspan`. This crate keeps that tree consistent with
//! the rectangular grid it represents.
//!
//! ## Features
//!
//! - **Grid projection**: a pure view mapping every logical slot to its cell
//! - **Structural commands**: insert/remove rows and columns, merge and split
//!   cells, heading rows and columns
//! - **Post-fixers**: every committed change is followed by invariant repair
//! - **Navigation**: Tab-style cell traversal that appends a row at the end
//! - **Exchange**: JSON table shape for paste and I/O (feature `serde`)
//! - **Typst**: `#table(...)` presentation mapping
//! - **WASM Support**: Compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ### Editing a table
//!
//! ```rust
//! use tablegrid::{Document, MergeDirection, TableCommand, TableGrid};
//!
//! let mut doc = Document::new();
//! let table = doc
//!     .execute(&TableCommand::InsertTable {
//!         index: 0,
//!         rows: 2,
//!         columns: 3,
//!         heading_rows: 1,
//!         heading_columns: 0,
//!     })
//!     .unwrap()
//!     .table;
//!
//! let first = TableGrid::project(&doc, table).cell_at(1, 0).unwrap().cell;
//! doc.execute(&TableCommand::MergeCell { cell: first, direction: MergeDirection::Right })
//!     .unwrap();
//!
//! let grid = TableGrid::project(&doc, table);
//! assert_eq!(grid.cell(first).unwrap().colspan, 2);
//! assert!(grid.is_rectangular());
//! ```
//!
//! ### Navigation
//!
//! ```rust
//! use tablegrid::{navigate, Direction, Document, Navigation, TableCommand};
//!
//! let mut doc = Document::new();
//! doc.execute(&TableCommand::InsertTable {
//!     index: 0,
//!     rows: 1,
//!     columns: 1,
//!     heading_rows: 0,
//!     heading_columns: 0,
//! })
//! .unwrap();
//!
//! // The only cell is also the last one: moving forward appends a row
//! let step = navigate(&mut doc, Direction::Forward).unwrap();
//! assert!(matches!(step, Navigation::Appended(_)));
//! ```

/// Core table engine
pub mod core;

/// Data layer - attribute names and aliases
pub mod data;

/// Feature modules - exchange and presentation formats
pub mod features;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export the engine
pub use crate::core::commands;
pub use crate::core::fixers;
pub use crate::core::{
    default_fixers, navigate, AttrValue, CellSlot, CommandOutput, Direction, Document,
    MergeDirection, Navigation, Node, NodeId, NodeKind, Position, PostFixer, Selection, Slot,
    SplitAxis, TableCommand, TableGrid, TableOptions, Writer,
};

// Re-export data modules
pub use data::constants;

// Re-export feature modules
pub use features::exchange;
pub use features::typst;
pub use features::{CellData, RowData, TableData};

// Re-export utilities
pub use utils::diagnostics;
pub use utils::error::{MergeFailure, SplitFailure, TableError, TableResult};

/// Load a single table from exchange JSON into a fresh document.
///
/// The table goes through the post-fixers like any pasted content, so the
/// returned document always holds a well-formed table.
#[cfg(feature = "serde")]
pub fn load_table(input: &str, options: TableOptions) -> TableResult<(Document, NodeId)> {
    let data = TableData::from_json(input)?;
    let mut doc = Document::with_options(options);
    let table = data.insert_into(&mut doc, 0)?;
    Ok((doc, table))
}

/// Normalize a table given as exchange JSON and return it as JSON
#[cfg(feature = "serde")]
pub fn normalize_json(input: &str) -> TableResult<String> {
    let (doc, table) = load_table(input, TableOptions::default())?;
    TableData::from_table(&doc, table)?.to_json()
}

/// Render a table given as exchange JSON as Typst markup
#[cfg(feature = "serde")]
pub fn json_to_typst(input: &str) -> TableResult<String> {
    let (doc, table) = load_table(input, TableOptions::default())?;
    typst::table_to_typst(&doc, table)
}

/// Read Typst `#table(...)` markup and return the normalized table as JSON
#[cfg(feature = "serde")]
pub fn typst_to_json(input: &str) -> TableResult<String> {
    let data = typst::typst_to_table(input)?;
    let mut doc = Document::new();
    let table = data.insert_into(&mut doc, 0)?;
    TableData::from_table(&doc, table)?.to_json()
}
