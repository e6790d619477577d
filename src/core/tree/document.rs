//! Arena-backed document tree
//!
//! The document owns every node in a flat arena. Nodes removed from the tree
//! stay in the arena detached, so a reverted change can put them back without
//! rebuilding anything.

use tracing::debug;

use super::node::{AttrValue, Node, NodeId, NodeKind};
use super::selection::Selection;
use super::writer::{Change, Writer};
use crate::core::context::TableOptions;
use crate::core::fixers::{default_fixers, PostFixer};
use crate::utils::error::{TableError, TableResult};

/// A committed group of changes
#[derive(Debug, Clone)]
pub(crate) struct Batch {
    pub(crate) changes: Vec<Change>,
}

/// The document tree
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    root: NodeId,
    pub(crate) selection: Selection,
    history: Vec<Batch>,
    version: u64,
    pub(crate) fixers: Vec<Box<dyn PostFixer>>,
    pub(crate) options: TableOptions,
}

impl Document {
    /// Create an empty document with the built-in post-fixers
    pub fn new() -> Self {
        Self::with_options(TableOptions::default())
    }

    /// Create an empty document with custom options
    pub fn with_options(options: TableOptions) -> Self {
        Document {
            nodes: vec![Node::new(NodeKind::Root)],
            root: NodeId::from_index(0),
            selection: Selection::None,
            history: Vec::new(),
            version: 0,
            fixers: default_fixers(),
            options,
        }
    }

    /// Register an extra post-fixer; it runs after the built-in ones
    pub fn register_post_fixer(&mut self, fixer: Box<dyn PostFixer>) {
        self.fixers.push(fixer);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut TableOptions {
        &mut self.options
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Number of committed non-empty transactions
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> TableResult<&Node> {
        self.get(id).ok_or(TableError::NodeNotFound(id))
    }

    pub fn kind(&self, id: NodeId) -> TableResult<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Fetch a node and check its kind
    pub fn expect_kind(&self, id: NodeId, expected: NodeKind) -> TableResult<&Node> {
        let node = self.node(id)?;
        if node.kind != expected {
            return Err(TableError::unexpected(id, expected, node.kind));
        }
        Ok(node)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Index of the node among its siblings
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.get(id).and_then(|n| n.attributes.get(name))
    }

    /// Read a non-negative integer attribute
    pub fn count_attribute(&self, id: NodeId, name: &str) -> Option<usize> {
        self.attribute(id, name).and_then(AttrValue::as_count)
    }

    /// The node itself or its closest ancestor of the given kind
    pub fn ancestor(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if node.kind == kind {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Tables directly under the root
    pub fn tables(&self) -> Vec<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&id| self.kind(id) == Ok(NodeKind::Table))
            .collect()
    }

    /// Text of every paragraph below `id`, one paragraph per line
    pub fn text_content(&self, id: NodeId) -> String {
        self.block_texts(id).join("\n")
    }

    /// Texts of the paragraphs below `id`, in document order
    pub fn block_texts(&self, id: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(id, &mut out);
        out
    }

    fn collect_texts(&self, id: NodeId, out: &mut Vec<String>) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.kind == NodeKind::Paragraph {
            out.push(node.text.clone());
            return;
        }
        for &child in &node.children {
            self.collect_texts(child, out);
        }
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Run `f` as one atomic change.
    ///
    /// On success the post-fixers run on every table the change touched and
    /// the whole batch is committed; on error every edit made so far is
    /// reverted and the error is returned.
    pub fn change<T>(
        &mut self,
        f: impl FnOnce(&mut Writer<'_>) -> TableResult<T>,
    ) -> TableResult<T> {
        self.transact(true, f)
    }

    fn transact<T>(
        &mut self,
        record: bool,
        f: impl FnOnce(&mut Writer<'_>) -> TableResult<T>,
    ) -> TableResult<T> {
        let mut writer = Writer::new(self);
        let result = f(&mut writer).and_then(|value| {
            writer.run_post_fixers()?;
            Ok(value)
        });

        match result {
            Ok(value) => {
                let changes = writer.into_changes();
                self.commit(changes, record);
                Ok(value)
            }
            Err(err) => {
                let reverted = writer.rollback();
                debug!(changes = reverted, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    fn commit(&mut self, changes: Vec<Change>, record: bool) {
        if changes.is_empty() {
            return;
        }
        self.version += 1;
        if record && self.options.record_history {
            self.history.push(Batch { changes });
            let limit = self.options.history_limit.max(1);
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }
    }

    /// Revert the last committed transaction.
    ///
    /// The reverted state goes through the post-fixers like any other
    /// change. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> TableResult<bool> {
        let Some(batch) = self.history.pop() else {
            return Ok(false);
        };

        let result = self.transact(false, |writer| {
            for change in batch.changes.iter().rev() {
                writer.apply_inverse(change)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => Ok(true),
            Err(err) => {
                self.history.push(batch);
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Raw mutation (no logging); only the writer calls these
    // ------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TableResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TableError::NodeNotFound(id))
    }

    pub(crate) fn attach(&mut self, node: NodeId, parent: NodeId, index: usize) -> TableResult<()> {
        let children = &mut self.node_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, node);
        self.node_mut(node)?.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn detach(&mut self, node: NodeId) -> TableResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        let children = &mut self.node_mut(parent)?.children;
        let Some(index) = children.iter().position(|&c| c == node) else {
            return Ok(None);
        };
        children.remove(index);
        self.node_mut(node)?.parent = None;
        Ok(Some((parent, index)))
    }

    pub(crate) fn put_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<AttrValue>,
    ) -> TableResult<Option<AttrValue>> {
        let attributes = &mut self.node_mut(node)?.attributes;
        Ok(match value {
            Some(value) => attributes.insert(name.to_string(), value),
            None => attributes.shift_remove(name),
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .field("history", &self.history.len())
            .finish()
    }
}
