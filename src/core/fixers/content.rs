//! Gives empty cells a paragraph

use super::PostFixer;
use crate::core::tree::{Document, NodeId, Writer};
use crate::utils::error::TableResult;

/// Inserts an empty paragraph into every cell without children.
#[derive(Debug, Default, Clone, Copy)]
pub struct CellContentFixer;

impl PostFixer for CellContentFixer {
    fn name(&self) -> &'static str {
        "cell-content"
    }

    fn fix(&self, writer: &mut Writer<'_>, table: NodeId) -> TableResult<bool> {
        let doc: &Document = writer;
        let empty: Vec<NodeId> = doc
            .children(table)
            .iter()
            .flat_map(|&row| doc.children(row).iter().copied())
            .filter(|&cell| doc.children(cell).is_empty())
            .collect();

        for &cell in &empty {
            let paragraph = writer.create_paragraph("");
            writer.append(paragraph, cell)?;
        }
        Ok(!empty.is_empty())
    }
}
