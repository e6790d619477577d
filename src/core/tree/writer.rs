//! Transactional writer
//!
//! Every edit to a [`Document`] goes through a `Writer`. The writer records
//! each edit as a [`Change`] so a failed transaction can be reverted and a
//! committed one undone.

use indexmap::IndexSet;
use std::ops::Deref;
use tracing::{debug, warn};

use super::document::Document;
use super::node::{AttrValue, Node, NodeId, NodeKind};
use super::selection::Selection;
use crate::core::fixers::PostFixer;
use crate::utils::error::{TableError, TableResult};

/// A single recorded edit
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change {
    Insert {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
    Remove {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
    Attribute {
        node: NodeId,
        name: String,
        old: Option<AttrValue>,
        new: Option<AttrValue>,
    },
    Text {
        node: NodeId,
        old: String,
        new: String,
    },
    Selection {
        old: Selection,
        new: Selection,
    },
}

/// Write access to a document for the duration of one transaction
pub struct Writer<'d> {
    doc: &'d mut Document,
    changes: Vec<Change>,
}

impl<'d> Writer<'d> {
    pub(crate) fn new(doc: &'d mut Document) -> Self {
        Writer {
            doc,
            changes: Vec::new(),
        }
    }

    pub(crate) fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Number of edits recorded so far in this transaction
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached node with attributes
    pub fn create_node<'a>(
        &mut self,
        kind: NodeKind,
        attributes: impl IntoIterator<Item = (&'a str, AttrValue)>,
    ) -> NodeId {
        let mut node = Node::new(kind);
        for (name, value) in attributes {
            node.attributes.insert(name.to_string(), value);
        }
        self.doc.alloc(node)
    }

    /// Create a detached node without attributes
    pub fn create_element(&mut self, kind: NodeKind) -> NodeId {
        self.doc.alloc(Node::new(kind))
    }

    /// Create a detached paragraph with text
    pub fn create_paragraph(&mut self, text: impl Into<String>) -> NodeId {
        let mut node = Node::new(NodeKind::Paragraph);
        node.text = text.into();
        self.doc.alloc(node)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Insert a detached node as child `index` of `parent`
    pub fn insert(&mut self, node: NodeId, parent: NodeId, index: usize) -> TableResult<()> {
        let child_kind = self.doc.kind(node)?;
        let parent_kind = self.doc.kind(parent)?;
        if !parent_kind.allows_child(child_kind) {
            return Err(TableError::SchemaViolation {
                parent: parent_kind,
                child: child_kind,
            });
        }
        if self.doc.parent(node).is_some() {
            return Err(TableError::invalid(format!(
                "{} is already attached to the tree",
                node
            )));
        }
        if self.doc.ancestor_chain_contains(parent, node) {
            return Err(TableError::invalid(format!(
                "{} cannot be inserted inside itself",
                node
            )));
        }
        let len = self.doc.children(parent).len();
        if index > len {
            return Err(TableError::out_of_range("child", index, len));
        }

        self.doc.attach(node, parent, index)?;
        self.changes.push(Change::Insert {
            node,
            parent,
            index,
        });
        Ok(())
    }

    /// Insert a detached node as the last child of `parent`
    pub fn append(&mut self, node: NodeId, parent: NodeId) -> TableResult<()> {
        let index = self.doc.children(parent).len();
        self.insert(node, parent, index)
    }

    /// Detach a node (and its subtree) from the tree
    pub fn remove(&mut self, node: NodeId) -> TableResult<()> {
        if node == self.doc.root() {
            return Err(TableError::invalid("the root cannot be removed"));
        }
        match self.doc.detach(node)? {
            Some((parent, index)) => {
                self.changes.push(Change::Remove {
                    node,
                    parent,
                    index,
                });
                Ok(())
            }
            None => Err(TableError::invalid(format!("{} is not attached", node))),
        }
    }

    /// Move an attached node to a new parent and index
    pub fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> TableResult<()> {
        self.remove(node)?;
        let len = self.doc.children(parent).len();
        self.insert(node, parent, index.min(len))
    }

    // ------------------------------------------------------------------
    // Attributes, text, selection
    // ------------------------------------------------------------------

    /// Set an attribute; setting the current value records nothing
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> TableResult<()> {
        let value = value.into();
        if self.doc.attribute(node, name) == Some(&value) {
            return Ok(());
        }
        let old = self.doc.put_attribute(node, name, Some(value.clone()))?;
        self.changes.push(Change::Attribute {
            node,
            name: name.to_string(),
            old,
            new: Some(value),
        });
        Ok(())
    }

    /// Remove an attribute; removing a missing attribute records nothing
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> TableResult<()> {
        self.doc.node(node)?;
        if self.doc.attribute(node, name).is_none() {
            return Ok(());
        }
        let old = self.doc.put_attribute(node, name, None)?;
        self.changes.push(Change::Attribute {
            node,
            name: name.to_string(),
            old,
            new: None,
        });
        Ok(())
    }

    /// Set a count attribute, dropping it when it equals `default`
    pub fn set_count(
        &mut self,
        node: NodeId,
        name: &str,
        value: usize,
        default: usize,
    ) -> TableResult<()> {
        if value == default {
            self.remove_attribute(node, name)
        } else {
            self.set_attribute(node, name, value)
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> TableResult<()> {
        let text = text.into();
        let target = self.doc.node_mut(node)?;
        if target.text == text {
            return Ok(());
        }
        let old = std::mem::replace(&mut target.text, text.clone());
        self.changes.push(Change::Text {
            node,
            old,
            new: text,
        });
        Ok(())
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if self.doc.selection == selection {
            return;
        }
        let old = std::mem::replace(&mut self.doc.selection, selection);
        self.changes.push(Change::Selection {
            old,
            new: selection,
        });
    }

    // ------------------------------------------------------------------
    // Revert / undo
    // ------------------------------------------------------------------

    /// Revert every change of this transaction, newest first
    pub(crate) fn rollback(mut self) -> usize {
        let count = self.changes.len();
        while let Some(change) = self.changes.pop() {
            if let Err(err) = revert(self.doc, &change) {
                warn!(error = %err, "failed to revert change during rollback");
            }
        }
        count
    }

    /// Apply the inverse of a committed change as a new, logged edit
    pub(crate) fn apply_inverse(&mut self, change: &Change) -> TableResult<()> {
        match change {
            Change::Insert { node, .. } => self.remove(*node),
            Change::Remove {
                node,
                parent,
                index,
            } => self.insert(*node, *parent, *index),
            Change::Attribute { node, name, old, .. } => match old {
                Some(value) => self.set_attribute(*node, name, value.clone()),
                None => self.remove_attribute(*node, name),
            },
            Change::Text { node, old, .. } => self.set_text(*node, old.clone()),
            Change::Selection { old, .. } => {
                self.set_selection(*old);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Post-fixer hook
    // ------------------------------------------------------------------

    /// Tables touched by this transaction, in the order they were touched
    fn touched_tables(&self) -> IndexSet<NodeId> {
        let mut tables = IndexSet::new();
        for change in &self.changes {
            let candidates: [Option<NodeId>; 2] = match change {
                Change::Insert { node, parent, .. } => [Some(*node), Some(*parent)],
                Change::Remove { parent, .. } => [Some(*parent), None],
                Change::Attribute { node, .. } | Change::Text { node, .. } => [Some(*node), None],
                Change::Selection { .. } => [None, None],
            };
            for candidate in candidates.into_iter().flatten() {
                if let Some(table) = self.doc.ancestor(candidate, NodeKind::Table) {
                    tables.insert(table);
                }
            }
        }
        tables
    }

    /// Run the registered post-fixers until the touched tables are stable.
    ///
    /// Fixers run in registration order; as soon as one of them edits a
    /// table the sequence restarts from the first fixer.
    pub(crate) fn run_post_fixers(&mut self) -> TableResult<()> {
        if !self.doc.options.run_post_fixers || self.changes.is_empty() {
            return Ok(());
        }
        let tables = self.touched_tables();
        if tables.is_empty() {
            return Ok(());
        }

        let fixers = std::mem::take(&mut self.doc.fixers);
        let result = self.fix_tables(&tables, &fixers);
        self.doc.fixers = fixers;
        result
    }

    /// Run the registered post-fixers on one table, whatever the options say
    pub(crate) fn fix_table(&mut self, table: NodeId) -> TableResult<()> {
        self.doc.expect_kind(table, NodeKind::Table)?;
        let tables: IndexSet<NodeId> = std::iter::once(table).collect();
        let fixers = std::mem::take(&mut self.doc.fixers);
        let result = self.fix_tables(&tables, &fixers);
        self.doc.fixers = fixers;
        result
    }

    fn fix_tables(
        &mut self,
        tables: &IndexSet<NodeId>,
        fixers: &[Box<dyn PostFixer>],
    ) -> TableResult<()> {
        let max_rounds = self.doc.options.max_fix_rounds.max(1);
        for _ in 0..max_rounds {
            let mut changed = false;
            for &table in tables {
                if !self.doc.is_attached(table) {
                    continue;
                }
                for fixer in fixers {
                    if fixer.fix(self, table)? {
                        debug!(fixer = fixer.name(), table = %table, "post-fixer repaired table");
                        changed = true;
                        break;
                    }
                }
            }
            if !changed {
                return Ok(());
            }
        }
        warn!(
            rounds = max_rounds,
            "post-fixers did not settle; table may still be inconsistent"
        );
        Ok(())
    }
}

impl Deref for Writer<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        &*self.doc
    }
}

/// Undo one change without logging it
fn revert(doc: &mut Document, change: &Change) -> TableResult<()> {
    match change {
        Change::Insert { node, .. } => {
            doc.detach(*node)?;
        }
        Change::Remove {
            node,
            parent,
            index,
        } => {
            doc.attach(*node, *parent, *index)?;
        }
        Change::Attribute { node, name, old, .. } => {
            doc.put_attribute(*node, name, old.clone())?;
        }
        Change::Text { node, old, .. } => {
            doc.node_mut(*node)?.text = old.clone();
        }
        Change::Selection { old, .. } => {
            doc.selection = *old;
        }
    }
    Ok(())
}

impl Document {
    /// Whether `needle` is `start` or one of its ancestors
    pub(crate) fn ancestor_chain_contains(&self, start: NodeId, needle: NodeId) -> bool {
        let mut current = Some(start);
        while let Some(id) = current {
            if id == needle {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}
