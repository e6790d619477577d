//! Integration tests for the tablegrid engine

use tablegrid::{
    diagnostics::check_table, navigate, typst, CellData, Direction, Document, MergeDirection,
    MergeFailure, Navigation, NodeId, NodeKind, RowData, Selection, SplitAxis, SplitFailure,
    TableCommand, TableData, TableError, TableGrid, TableOptions,
};

// ============================================================================
// Helpers
// ============================================================================

fn cell(text: &str) -> CellData {
    CellData::new(text)
}

fn span(text: &str, colspan: usize, rowspan: usize) -> CellData {
    CellData::with_spans(text, colspan, rowspan)
}

fn build(doc: &mut Document, rows: Vec<Vec<CellData>>, heading_rows: usize, heading_columns: usize) -> NodeId {
    let data = TableData {
        heading_rows,
        heading_columns,
        rows: rows.into_iter().map(|cells| RowData { cells }).collect(),
    };
    data.insert_into(doc, 0).unwrap()
}

fn texts(rows: &[&[&str]]) -> Vec<Vec<CellData>> {
    rows.iter()
        .map(|row| row.iter().map(|&text| cell(text)).collect())
        .collect()
}

fn layout(doc: &Document, table: NodeId) -> Vec<Vec<String>> {
    TableGrid::project(doc, table).layout(doc)
}

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn cell_at(doc: &Document, table: NodeId, row: usize, column: usize) -> NodeId {
    TableGrid::project(doc, table).cell_at(row, column).unwrap().cell
}

fn caret_in(doc: &mut Document, cell: NodeId) {
    let paragraph = doc.children(cell)[0];
    doc.change(|w| {
        w.set_selection(Selection::caret(paragraph, 0));
        Ok(())
    })
    .unwrap();
}

fn heading_rows(doc: &Document, table: NodeId) -> usize {
    TableData::from_table(doc, table).unwrap().heading_rows
}

// ============================================================================
// Grid projection
// ============================================================================

mod projection {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_slot_covered_once() {
        let mut doc = Document::new();
        let t = build(
            &mut doc,
            vec![
                vec![span("A", 2, 1), cell("B"), span("C", 1, 3)],
                vec![cell("D"), span("E", 2, 2)],
                vec![cell("F")],
            ],
            0,
            0,
        );

        let g = TableGrid::project(&doc, t);
        assert!(g.is_rectangular());
        assert_eq!((g.row_count(), g.column_count()), (3, 4));
        assert_eq!(
            layout(&doc, t),
            grid(&[
                &["A", "A", "B", "C"],
                &["D", "E", "E", "C"],
                &["F", "E", "E", "C"],
            ])
        );
        for row in 0..3 {
            for column in 0..4 {
                assert!(g.slot(row, column).is_some());
            }
        }
    }

    #[test]
    fn test_projection_is_pure() {
        let mut doc = Document::with_options(TableOptions::raw());
        let t = build(&mut doc, vec![vec![span("A", 1, 9), cell("B")], vec![]], 0, 0);
        let version = doc.version();

        let g = TableGrid::project(&doc, t);
        assert!(!g.is_rectangular());
        assert_eq!(doc.version(), version);
    }
}

// ============================================================================
// Structural commands
// ============================================================================

mod commands {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_then_remove_row_restores_grid() {
        for at in 0..=3 {
            let mut doc = Document::new();
            let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"], &["E", "F"]]), 0, 0);
            let before = layout(&doc, t);

            doc.execute(&TableCommand::InsertRow {
                table: t,
                at,
                copy_structure_from: None,
            })
            .unwrap();
            assert_eq!(TableGrid::project(&doc, t).row_count(), 4);

            doc.execute(&TableCommand::RemoveRows { table: t, rows: vec![at] })
                .unwrap();
            assert_eq!(layout(&doc, t), before, "row inserted at {at}");
        }
    }

    #[test]
    fn test_insert_then_remove_column_restores_grid() {
        for at in 0..=2 {
            let mut doc = Document::new();
            let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"]]), 1, 1);
            let before = layout(&doc, t);

            doc.execute(&TableCommand::InsertColumn { table: t, at }).unwrap();
            assert_eq!(TableGrid::project(&doc, t).column_count(), 3);

            doc.execute(&TableCommand::RemoveColumns { table: t, columns: vec![at] })
                .unwrap();
            assert_eq!(layout(&doc, t), before, "column inserted at {at}");
            assert!(TableGrid::project(&doc, t).is_rectangular());
        }
    }

    #[test]
    fn test_remove_first_column_under_colspan() {
        // 2x2 table, (0,0) merged with (0,1)
        let mut doc = Document::new();
        let t = build(&mut doc, vec![vec![span("A", 2, 1)], vec![cell("C"), cell("D")]], 0, 0);

        doc.execute(&TableCommand::RemoveColumns { table: t, columns: vec![0] })
            .unwrap();

        let g = TableGrid::project(&doc, t);
        assert!(g.is_rectangular());
        assert_eq!((g.row_count(), g.column_count()), (2, 1));
        assert_eq!(g.cell_at(0, 0).unwrap().colspan, 1);
        assert_eq!(layout(&doc, t), grid(&[&["A"], &["D"]]));
    }

    #[test]
    fn test_merge_then_split_restores_two_cells() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"]]), 0, 0);
        let a = cell_at(&doc, t, 0, 0);

        doc.execute(&TableCommand::MergeCell {
            cell: a,
            direction: MergeDirection::Right,
        })
        .unwrap();
        assert_eq!(doc.block_texts(a), vec!["A", "B"]);
        assert_eq!(TableGrid::project(&doc, t).cell(a).unwrap().colspan, 2);

        let output = doc
            .execute(&TableCommand::SplitCell {
                cell: a,
                axis: SplitAxis::Vertical,
            })
            .unwrap();

        let g = TableGrid::project(&doc, t);
        assert!(g.is_rectangular());
        let slots: Vec<_> = g.cells_in_row(0).map(|s| (s.colspan, s.rowspan)).collect();
        assert_eq!(slots, vec![(1, 1), (1, 1)]);
        assert_eq!(output.cell, Some(cell_at(&doc, t, 0, 1)));
        assert_eq!(doc.block_texts(a), vec!["A", "B"]);
    }

    #[test]
    fn test_vertical_merge_and_heading_rows() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"], &["E", "F"]]), 0, 0);
        let a = cell_at(&doc, t, 0, 0);
        doc.execute(&TableCommand::MergeCell {
            cell: a,
            direction: MergeDirection::Down,
        })
        .unwrap();

        doc.execute(&TableCommand::SetHeadingRows { table: t, count: 1 })
            .unwrap();

        let g = TableGrid::project(&doc, t);
        assert!(g.is_rectangular());
        assert!(g.cells().iter().all(|s| s.row_end() <= 1 || s.row >= 1));
        assert_eq!(g.cell(a).unwrap().rowspan, 1);
        assert!(check_table(&doc, t).unwrap().is_empty());
    }

    #[test]
    fn test_refused_commands_have_no_effect() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"]]), 0, 0);
        let version = doc.version();
        let before = TableData::from_table(&doc, t).unwrap();

        let a = cell_at(&doc, t, 0, 0);
        let b = cell_at(&doc, t, 0, 1);
        let c = cell_at(&doc, t, 1, 0);

        assert_eq!(
            doc.execute(&TableCommand::MergeRange { cells: vec![a, b, c] }),
            Err(TableError::MergeNotPossible(MergeFailure::NotRectangular))
        );
        assert_eq!(
            doc.execute(&TableCommand::SplitCell {
                cell: a,
                axis: SplitAxis::Horizontal
            }),
            Err(TableError::SplitNotPossible(SplitFailure::SingleRow))
        );
        assert!(matches!(
            doc.execute(&TableCommand::SetHeadingColumns { table: t, count: 3 }),
            Err(TableError::HeadingOutOfRange { .. })
        ));
        assert_eq!(
            doc.execute(&TableCommand::RemoveRows { table: t, rows: vec![0, 1] }),
            Err(TableError::RemovesEverything { what: "row" })
        );

        assert_eq!(doc.version(), version);
        assert_eq!(TableData::from_table(&doc, t).unwrap(), before);
    }

    #[test]
    fn test_command_sequence_keeps_grid_valid() {
        let mut doc = Document::new();
        let table = doc
            .execute(&TableCommand::InsertTable {
                index: 0,
                rows: 3,
                columns: 3,
                heading_rows: 1,
                heading_columns: 1,
            })
            .unwrap()
            .table;

        let center = cell_at(&doc, table, 1, 1);
        doc.execute(&TableCommand::MergeCell {
            cell: center,
            direction: MergeDirection::Right,
        })
        .unwrap();
        doc.execute(&TableCommand::MergeCell {
            cell: center,
            direction: MergeDirection::Down,
        })
        .unwrap_err();
        doc.execute(&TableCommand::InsertRowBelow { cell: center }).unwrap();
        doc.execute(&TableCommand::InsertColumnLeft { cell: center }).unwrap();
        doc.execute(&TableCommand::SetHeadingRows { table, count: 2 }).unwrap();
        doc.execute(&TableCommand::RemoveColumns { table, columns: vec![0] })
            .unwrap();

        let g = TableGrid::project(&doc, table);
        assert!(g.is_rectangular());
        assert!(check_table(&doc, table).unwrap().is_empty());
        assert!(!doc.normalize(table).unwrap());
    }

    #[test]
    fn test_undo_reverts_command_and_repairs() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"]]), 0, 0);
        let before = layout(&doc, t);

        doc.execute(&TableCommand::InsertColumn { table: t, at: 1 }).unwrap();
        assert!(doc.undo().unwrap());
        assert_eq!(layout(&doc, t), before);
    }
}

// ============================================================================
// Post-fixers
// ============================================================================

mod fixers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_row_from_paste_is_padded() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B", "C"], &["D", "E"]]), 0, 0);

        let row = doc.children(t)[1];
        assert_eq!(doc.children(row).len(), 3);
        assert_eq!(layout(&doc, t), grid(&[&["A", "B", "C"], &["D", "E", ""]]));
    }

    #[test]
    fn test_fixers_are_idempotent() {
        let mut doc = Document::with_options(TableOptions::raw());
        let t = build(
            &mut doc,
            vec![
                vec![span("A", 0, 7), span("B", 3, 1)],
                vec![span("C", 2, 2)],
                vec![],
            ],
            9,
            9,
        );

        assert!(doc.normalize(t).unwrap());
        assert!(!doc.normalize(t).unwrap());
        assert!(TableGrid::project(&doc, t).is_rectangular());
        assert!(check_table(&doc, t).unwrap().is_empty());
    }

    #[test]
    fn test_raw_edits_are_repaired_on_next_change() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"], &["C", "D"]]), 0, 0);
        let d = cell_at(&doc, t, 1, 1);

        // An edit that bypasses the commands
        doc.change(|w| {
            let row = w.parent(d).unwrap();
            w.remove(d)?;
            let extra = w.create_element(NodeKind::TableCell);
            w.append(extra, row)?;
            w.set_attribute(extra, "colspan", 4usize)
        })
        .unwrap();

        let g = TableGrid::project(&doc, t);
        assert!(g.is_rectangular());
        assert_eq!(g.column_count(), 5);
    }
}

// ============================================================================
// Navigation
// ============================================================================

mod navigation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forward_from_last_cell_appends_row() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["H1", "H2"], &["A", "B"], &["C", "D"]]), 1, 0);
        let last = cell_at(&doc, t, 2, 1);
        caret_in(&mut doc, last);

        let step = navigate(&mut doc, Direction::Forward).unwrap();
        let Navigation::Appended(new_cell) = step else {
            panic!("expected an appended row, got {step:?}");
        };

        let g = TableGrid::project(&doc, t);
        assert_eq!(g.row_count(), 4);
        assert_eq!(g.cell(new_cell).map(|s| (s.row, s.column)), Some((3, 0)));
        assert_eq!(heading_rows(&doc, t), 1);

        // Landing in the new row is itself a valid position to keep going
        let b = navigate(&mut doc, Direction::Forward).unwrap();
        assert_eq!(b, Navigation::Moved(cell_at(&doc, t, 3, 1)));
    }

    #[test]
    fn test_backward_from_first_cell_is_noop() {
        let mut doc = Document::new();
        let t = build(&mut doc, texts(&[&["A", "B"]]), 0, 0);
        let a = cell_at(&doc, t, 0, 0);
        caret_in(&mut doc, a);
        let version = doc.version();
        let selection = doc.selection();

        assert_eq!(navigate(&mut doc, Direction::Backward).unwrap(), Navigation::Stayed);
        assert_eq!(doc.version(), version);
        assert_eq!(doc.selection(), selection);
    }

    #[test]
    fn test_traversal_visits_each_cell_once() {
        let mut doc = Document::new();
        let t = build(
            &mut doc,
            vec![
                vec![span("A", 2, 2), cell("B")],
                vec![cell("C")],
                vec![cell("D"), cell("E"), cell("F")],
            ],
            0,
            0,
        );
        let a = cell_at(&doc, t, 0, 0);
        caret_in(&mut doc, a);

        let mut seen = vec![doc.text_content(a)];
        loop {
            match navigate(&mut doc, Direction::Forward).unwrap() {
                Navigation::Moved(cell) => seen.push(doc.text_content(cell)),
                Navigation::Appended(_) => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seen, vec!["A", "B", "C", "D", "E", "F"]);
    }
}

// ============================================================================
// Exchange and presentation
// ============================================================================

mod formats {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exchange_round_trip_reproduces_grid() {
        let mut doc = Document::new();
        let t = build(
            &mut doc,
            vec![
                vec![cell("Name"), span("Scores", 2, 1)],
                vec![span("Ada", 1, 2), cell("1"), cell("2")],
                vec![cell("3"), cell("4")],
            ],
            1,
            1,
        );

        let json = TableData::from_table(&doc, t).unwrap().to_json().unwrap();
        let mut other = Document::new();
        let copy = TableData::from_json(&json).unwrap().insert_into(&mut other, 0).unwrap();

        assert_eq!(
            TableGrid::project(&other, copy).shape(),
            TableGrid::project(&doc, t).shape()
        );
        assert_eq!(layout(&other, copy), layout(&doc, t));
    }

    #[test]
    fn test_typst_round_trip() {
        let mut doc = Document::new();
        let t = build(
            &mut doc,
            vec![
                vec![cell("Name"), span("Scores", 2, 1)],
                vec![span("Ada", 1, 2), cell("1"), cell("2")],
                vec![cell("3"), cell("4")],
            ],
            1,
            0,
        );

        let markup = typst::table_to_typst(&doc, t).unwrap();
        assert!(markup.starts_with("#table(\n    columns: 3,\n    table.header(\n"));

        let data = typst::typst_to_table(&markup).unwrap();
        assert_eq!(data, TableData::from_table(&doc, t).unwrap());
    }

    #[test]
    fn test_library_helpers() {
        let json = tablegrid::normalize_json(
            r#"{ "rows": [ { "cells": [ { "content": ["A"] }, { "content": ["B"] } ] }, { "cells": [ { "content": ["C"] } ] } ] }"#,
        )
        .unwrap();
        let data = TableData::from_json(&json).unwrap();
        assert_eq!(data.rows[1].cells.len(), 2);

        let markup = tablegrid::json_to_typst(&json).unwrap();
        assert!(markup.contains("[C], [],"));
    }
}
