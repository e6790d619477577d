//! Selection state held by the document

use super::node::NodeId;

/// A position inside a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Block (or any node) the position is in
    pub node: NodeId,
    /// Character offset inside the block
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Position { node, offset }
    }
}

/// Current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// Collapsed cursor
    Caret(Position),
    /// Range between two positions
    Range { anchor: Position, focus: Position },
    /// A whole node selected as one object (e.g. a table)
    Object(NodeId),
}

impl Selection {
    pub fn caret(node: NodeId, offset: usize) -> Self {
        Selection::Caret(Position::new(node, offset))
    }

    pub fn range(anchor: Position, focus: Position) -> Self {
        Selection::Range { anchor, focus }
    }

    /// Node the selection's focus is in
    pub fn focus_node(&self) -> Option<NodeId> {
        match self {
            Selection::None => None,
            Selection::Caret(pos) => Some(pos.node),
            Selection::Range { focus, .. } => Some(focus.node),
            Selection::Object(node) => Some(*node),
        }
    }

    /// The selected object, if the selection is an object selection
    pub fn selected_object(&self) -> Option<NodeId> {
        match self {
            Selection::Object(node) => Some(*node),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}
