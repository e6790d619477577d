//! Node types for the document tree

use indexmap::IndexMap;
use std::fmt;

/// Arena index of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node types known to the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Table,
    TableRow,
    TableCell,
    Paragraph,
}

impl NodeKind {
    /// Model name of the node type
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "$root",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::Paragraph => "paragraph",
        }
    }

    /// Whether `child` may be placed directly inside a node of this type.
    ///
    /// Cells only take blocks, so nested tables are rejected here.
    pub fn allows_child(&self, child: NodeKind) -> bool {
        matches!(
            (self, child),
            (NodeKind::Root, NodeKind::Table)
                | (NodeKind::Root, NodeKind::Paragraph)
                | (NodeKind::Table, NodeKind::TableRow)
                | (NodeKind::TableRow, NodeKind::TableCell)
                | (NodeKind::TableCell, NodeKind::Paragraph)
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute value stored on a node
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(u32),
    Text(String),
    Bool(bool),
}

impl AttrValue {
    /// Read the value as a count.
    ///
    /// Numeric text is accepted since pasted content often carries spans as
    /// strings.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            AttrValue::Number(n) => Some(*n as usize),
            AttrValue::Text(s) => s.trim().parse().ok(),
            AttrValue::Bool(_) => None,
        }
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Number(value)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Number(value.min(u32::MAX as usize) as u32)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => write!(f, "{:?}", s),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A node in the document arena
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) attributes: IndexMap<String, AttrValue>,
    pub(crate) text: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            attributes: IndexMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attributes(&self) -> &IndexMap<String, AttrValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Text of a paragraph (empty for other kinds)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rules() {
        assert!(NodeKind::Table.allows_child(NodeKind::TableRow));
        assert!(NodeKind::TableCell.allows_child(NodeKind::Paragraph));
        assert!(!NodeKind::TableCell.allows_child(NodeKind::Table));
        assert!(!NodeKind::TableRow.allows_child(NodeKind::Paragraph));
        assert!(!NodeKind::Table.allows_child(NodeKind::TableCell));
    }

    #[test]
    fn test_attr_value_as_count() {
        assert_eq!(AttrValue::Number(3).as_count(), Some(3));
        assert_eq!(AttrValue::from(" 2 ").as_count(), Some(2));
        assert_eq!(AttrValue::from("wide").as_count(), None);
        assert_eq!(AttrValue::Bool(true).as_count(), None);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::from_index(7).to_string(), "#7");
        assert_eq!(NodeKind::TableCell.to_string(), "tableCell");
    }
}
