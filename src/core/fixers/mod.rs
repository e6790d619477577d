//! Post-fixers
//!
//! Repair passes run by the transaction commit path on every table a change
//! touched. Inbound content is never rejected; it is normalized here.
//!
//! Built-in fixers, in the order they run:
//! 1. [`RowWidthFixer`] pads short rows
//! 2. [`SpanBoundsFixer`] clamps spans to the table edges
//! 3. [`HeadingFixer`] keeps spans off the heading boundary
//! 4. [`CellContentFixer`] gives every cell a paragraph
//!
//! Each fixer reports whether it edited the table. A table that is already
//! consistent is left untouched.

mod content;
mod heading;
mod row_width;
mod span_bounds;


use crate::core::tree::{Document, NodeId, Writer};
use crate::utils::error::TableResult;

pub use content::CellContentFixer;
pub use heading::HeadingFixer;
pub use row_width::RowWidthFixer;
pub use span_bounds::SpanBoundsFixer;

/// A repair pass over one table
pub trait PostFixer {
    /// Fixer name, as used in logs
    fn name(&self) -> &'static str;

    /// Repair `table`; returns whether anything was edited
    fn fix(&self, writer: &mut Writer<'_>, table: NodeId) -> TableResult<bool>;
}

/// The built-in fixers in their fixed order
pub fn default_fixers() -> Vec<Box<dyn PostFixer>> {
    vec![
        Box::new(RowWidthFixer),
        Box::new(SpanBoundsFixer),
        Box::new(HeadingFixer),
        Box::new(CellContentFixer),
    ]
}

impl Document {
    /// Run the registered post-fixers on a table now.
    ///
    /// Returns whether the table was edited.
    pub fn normalize(&mut self, table: NodeId) -> TableResult<bool> {
        let version = self.version();
        self.change(|writer| writer.fix_table(table))?;
        Ok(self.version() != version)
    }

    /// Normalize every table under the root
    pub fn normalize_all(&mut self) -> TableResult<usize> {
        let mut fixed = 0;
        for table in self.tables() {
            if self.normalize(table)? {
                fixed += 1;
            }
        }
        Ok(fixed)
    }
}
