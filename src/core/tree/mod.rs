//! Document Tree
//!
//! A small arena-backed tree of tables, rows, cells and paragraphs with
//! attribute storage, a selection, and transactional edits.
//!
//! # Architecture
//!
//! ```text
//! Document::change(|writer| ...) -> edits logged as Changes -> post-fixers -> commit
//!                                 \-> Err: changes reverted, nothing visible
//! ```
//!
//! Reads go through [`Document`]; writes only through a [`Writer`], which
//! dereferences to the document so projections can be re-derived mid-edit.

mod document;
mod node;
mod selection;
mod writer;

#[cfg(test)]
mod tests;

// Re-export public API
pub use document::Document;
pub use node::{AttrValue, Node, NodeId, NodeKind};
pub use selection::{Position, Selection};
pub use writer::Writer;
