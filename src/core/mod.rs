//! Core table engine
//!
//! This module contains:
//! - `tree`: the arena document tree and its transactions
//! - `table`: the logical grid projection of a table
//! - `commands`: structural mutators
//! - `fixers`: post-transaction invariant repair
//! - `navigation`: cell-to-cell cursor movement

pub mod commands;
pub mod context;
pub mod fixers;
pub mod navigation;
pub mod table;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use commands::{CommandOutput, MergeDirection, SplitAxis, TableCommand};
pub use context::TableOptions;
pub use fixers::{default_fixers, PostFixer};
pub use navigation::{navigate, Direction, Navigation};
pub use table::{CellSlot, Slot, TableGrid};
pub use tree::{AttrValue, Document, Node, NodeId, NodeKind, Position, Selection, Writer};
