//! Tests for the document tree and transactions

use super::*;
use crate::core::context::TableOptions;
use crate::core::testing::table;
use crate::utils::error::TableError;
use pretty_assertions::assert_eq;

fn raw_doc() -> Document {
    Document::with_options(TableOptions::raw())
}

#[test]
fn test_new_document_is_empty() {
    let doc = Document::new();
    assert_eq!(doc.kind(doc.root()), Ok(NodeKind::Root));
    assert!(doc.children(doc.root()).is_empty());
    assert!(doc.selection().is_none());
    assert_eq!(doc.version(), 0);
    assert!(!doc.can_undo());
}

#[test]
fn test_change_commits_and_bumps_version() {
    let mut doc = raw_doc();
    let p = doc
        .change(|w| {
            let p = w.create_paragraph("hello");
            let root = w.root();
            w.append(p, root)?;
            Ok(p)
        })
        .unwrap();

    assert_eq!(doc.version(), 1);
    assert_eq!(doc.parent(p), Some(doc.root()));
    assert_eq!(doc.text_content(doc.root()), "hello");
    assert!(doc.can_undo());
}

#[test]
fn test_empty_change_does_not_bump_version() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    let version = doc.version();

    // Setting an attribute to its current value records nothing
    doc.change(|w| {
        let _ = w.create_element(NodeKind::Paragraph);
        w.set_attribute(t, "note", "x")?;
        w.set_attribute(t, "note", "x")?;
        w.remove_attribute(t, "note")?;
        w.remove_attribute(t, "note")
    })
    .unwrap();
    assert_eq!(doc.version(), version + 1);

    doc.change(|w| w.remove_attribute(t, "note")).unwrap();
    assert_eq!(doc.version(), version + 1);
}

#[test]
fn test_failed_change_is_rolled_back() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A", "B"]]);
    let row = doc.children(t)[0];
    let a = doc.children(row)[0];
    let version = doc.version();

    let err = doc
        .change(|w| {
            w.remove(a)?;
            w.set_attribute(t, "headingRows", 1usize)?;
            w.set_selection(Selection::Object(t));
            Err::<(), _>(TableError::invalid("abort"))
        })
        .unwrap_err();

    assert_eq!(err, TableError::invalid("abort"));
    assert_eq!(doc.version(), version);
    assert_eq!(doc.children(row)[0], a);
    assert_eq!(doc.parent(a), Some(row));
    assert!(doc.attribute(t, "headingRows").is_none());
    assert!(doc.selection().is_none());
}

#[test]
fn test_schema_violation() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    let row = doc.children(t)[0];
    let cell = doc.children(row)[0];

    let err = doc
        .change(|w| {
            let nested = w.create_element(NodeKind::Table);
            w.append(nested, cell)
        })
        .unwrap_err();
    assert_eq!(
        err,
        TableError::SchemaViolation {
            parent: NodeKind::TableCell,
            child: NodeKind::Table,
        }
    );

    let err = doc
        .change(|w| {
            let p = w.create_paragraph("x");
            w.append(p, row)
        })
        .unwrap_err();
    assert!(matches!(err, TableError::SchemaViolation { .. }));
}

#[test]
fn test_insert_rejects_attached_and_cycles() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    let row = doc.children(t)[0];

    let err = doc.change(|w| w.insert(row, t, 0)).unwrap_err();
    assert!(matches!(err, TableError::InvalidInput(_)));

    let err = doc
        .change(|w| {
            let root = w.root();
            w.remove(root)
        })
        .unwrap_err();
    assert!(matches!(err, TableError::InvalidInput(_)));

    let cell = doc.children(row)[0];
    let err = doc
        .change(|w| {
            w.remove(t)?;
            w.insert(t, cell, 0)
        })
        .unwrap_err();
    assert!(matches!(err, TableError::SchemaViolation { .. }));
    assert_eq!(doc.parent(t), Some(doc.root()));
}

#[test]
fn test_insert_index_out_of_range() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    let err = doc
        .change(|w| {
            let row = w.create_element(NodeKind::TableRow);
            w.insert(row, t, 5)
        })
        .unwrap_err();
    assert_eq!(err, TableError::out_of_range("child", 5, 1));
}

#[test]
fn test_undo_reverts_last_batch() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A", "B"]]);
    let row = doc.children(t)[0];
    let b = doc.children(row)[1];

    doc.change(|w| {
        w.remove(b)?;
        w.set_attribute(t, "headingColumns", 1usize)
    })
    .unwrap();
    assert_eq!(doc.children(row).len(), 1);

    assert!(doc.undo().unwrap());
    assert_eq!(doc.children(row).len(), 2);
    assert_eq!(doc.children(row)[1], b);
    assert!(doc.attribute(t, "headingColumns").is_none());

    // The table insertion itself
    assert!(doc.undo().unwrap());
    assert!(doc.tables().is_empty());
    assert!(!doc.undo().unwrap());
}

#[test]
fn test_history_limit() {
    let mut options = TableOptions::raw();
    options.history_limit = 2;
    let mut doc = Document::with_options(options);
    let t = table(&mut doc, &[&["A"]]);
    for n in 1..=3usize {
        doc.change(|w| w.set_attribute(t, "n", n)).unwrap();
    }
    assert!(doc.undo().unwrap());
    assert!(doc.undo().unwrap());
    assert!(!doc.undo().unwrap());
    assert_eq!(doc.count_attribute(t, "n"), Some(1));
}

#[test]
fn test_no_history() {
    let mut doc = Document::with_options(TableOptions::no_history());
    table(&mut doc, &[&["A"]]);
    assert_eq!(doc.version(), 1);
    assert!(!doc.can_undo());
}

#[test]
fn test_move_node_and_ancestors() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A", "B"], &["C"]]);
    let rows = doc.children(t).to_vec();
    let b = doc.children(rows[0])[1];

    doc.change(|w| w.move_node(b, rows[1], 0)).unwrap();
    assert_eq!(doc.index_of(b), Some(0));
    assert_eq!(doc.parent(b), Some(rows[1]));
    assert_eq!(doc.ancestor(b, NodeKind::Table), Some(t));
    assert_eq!(doc.ancestor(t, NodeKind::Table), Some(t));
    assert!(doc.is_attached(b));
}

#[test]
fn test_text_and_block_texts() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    let cell = doc.children(doc.children(t)[0])[0];
    doc.change(|w| {
        let p = w.create_paragraph("second");
        w.append(p, cell)
    })
    .unwrap();

    assert_eq!(doc.block_texts(cell), vec!["A", "second"]);
    assert_eq!(doc.text_content(cell), "A\nsecond");

    let first = doc.children(cell)[0];
    doc.change(|w| w.set_text(first, "first")).unwrap();
    assert_eq!(doc.node(first).unwrap().text(), "first");
}

#[test]
fn test_selection_is_part_of_the_transaction() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    doc.change(|w| {
        w.set_selection(Selection::Object(t));
        Ok(())
    })
    .unwrap();
    assert_eq!(doc.selection().selected_object(), Some(t));

    doc.undo().unwrap();
    assert!(doc.selection().is_none());
}

#[test]
fn test_expect_kind() {
    let mut doc = raw_doc();
    let t = table(&mut doc, &[&["A"]]);
    assert!(doc.expect_kind(t, NodeKind::Table).is_ok());
    assert_eq!(
        doc.expect_kind(t, NodeKind::TableCell).unwrap_err(),
        TableError::unexpected(t, NodeKind::TableCell, NodeKind::Table)
    );
}
