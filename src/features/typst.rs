//! Typst presentation mapping for tables
//!
//! Downcast writes a table as Typst markup, one line per physical row:
//!
//! ```text
//! #table(
//!     columns: 3,
//!     table.header(
//!         [Name], table.cell(colspan: 2)[Scores],
//!     ),
//!     table.cell(rowspan: 2)[Ada#parbreak()Lovelace], [1], [2],
//!     [3], [4],
//! )
//! ```
//!
//! Upcast reads the same row-per-line layout back into [`TableData`]. Typst
//! has no notion of heading columns, so their count travels in a
//! `// headingColumns: n` line comment. A row whose slots are all covered by
//! rowspans from above has no cells and is written as `// empty row`.

use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::table::{heading_columns, heading_rows, read_span, TableGrid};
use crate::core::tree::{Document, NodeId, NodeKind};
use crate::data::constants::{
    canonical_attribute, COLSPAN, DEFAULT_SPAN, HEADING_COLUMNS, ROWSPAN,
};
use crate::features::exchange::{CellData, RowData, TableData};
use crate::utils::error::{TableError, TableResult};

/// Paragraph separator inside cell content
pub const PARBREAK: &str = "#parbreak()";

/// Line written for a row whose slots are all covered by rowspans from above
pub const EMPTY_ROW: &str = "// empty row";

lazy_static! {
    /// `table.cell(args)[content]` or `[content]`
    static ref CELL_RE: Regex =
        Regex::new(r"(?:table\.cell\(([^)]*)\))?\[((?:\\.|[^\\\]])*)\]").unwrap();

    /// `name: 3` inside `table.cell(...)`
    static ref NAMED_ARG_RE: Regex = Regex::new(r"([\w-]+)\s*:\s*(\d+)").unwrap();

    /// `columns: 3` or `columns: (auto, auto)`
    static ref COLUMNS_RE: Regex =
        Regex::new(r"^columns\s*:\s*(?:(\d+)|\(([^)]*)\))\s*,?$").unwrap();

    /// Heading column count comment
    static ref HEADING_COLUMNS_RE: Regex =
        Regex::new(&format!(r"^//\s*{HEADING_COLUMNS}\s*:\s*(\d+)\s*$")).unwrap();
}

// ============================================================================
// Downcast
// ============================================================================

/// Escape text for Typst content brackets
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '[' | ']' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '`' | '~') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Typst expression for one cell
fn cell_to_typst(doc: &Document, cell: NodeId) -> String {
    let content = doc
        .block_texts(cell)
        .iter()
        .map(|text| escape_text(text))
        .collect::<Vec<_>>()
        .join(PARBREAK);

    let mut attrs = Vec::new();
    let rowspan = read_span(doc, cell, ROWSPAN);
    let colspan = read_span(doc, cell, COLSPAN);
    if rowspan > DEFAULT_SPAN {
        attrs.push(format!("rowspan: {rowspan}"));
    }
    if colspan > DEFAULT_SPAN {
        attrs.push(format!("colspan: {colspan}"));
    }

    if attrs.is_empty() {
        format!("[{content}]")
    } else {
        format!("table.cell({})[{content}]", attrs.join(", "))
    }
}

/// Write a table as Typst `#table(...)` markup
pub fn table_to_typst(doc: &Document, table: NodeId) -> TableResult<String> {
    doc.expect_kind(table, NodeKind::Table)?;
    let grid = TableGrid::project(doc, table);
    let header_rows = heading_rows(doc, table).min(grid.row_count());
    let header_columns = heading_columns(doc, table);

    let mut output = String::new();
    let _ = writeln!(output, "#table(");
    let _ = writeln!(output, "    columns: {},", grid.column_count().max(1));
    if header_columns > 0 {
        let _ = writeln!(output, "    // {HEADING_COLUMNS}: {header_columns}");
    }

    for (index, &row) in grid.rows().iter().enumerate() {
        if index == 0 && header_rows > 0 {
            let _ = writeln!(output, "    table.header(");
        }
        let indent = if index < header_rows { "        " } else { "    " };
        let cells: Vec<String> = doc
            .children(row)
            .iter()
            .map(|&cell| cell_to_typst(doc, cell))
            .collect();
        if cells.is_empty() {
            let _ = writeln!(output, "{indent}{EMPTY_ROW}");
        } else {
            let _ = writeln!(output, "{indent}{},", cells.join(", "));
        }
        if index + 1 == header_rows {
            let _ = writeln!(output, "    ),");
        }
    }

    output.push_str(")\n");
    Ok(output)
}

/// Write every top-level block of the document, separated by blank lines
pub fn document_to_typst(doc: &Document) -> TableResult<String> {
    let mut blocks = Vec::new();
    for &child in doc.children(doc.root()) {
        match doc.kind(child)? {
            NodeKind::Table => blocks.push(table_to_typst(doc, child)?.trim_end().to_string()),
            _ => blocks.push(
                doc.block_texts(child)
                    .iter()
                    .map(|text| escape_text(text))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            ),
        }
    }
    let mut output = blocks.join("\n\n");
    output.push('\n');
    Ok(output)
}

// ============================================================================
// Upcast
// ============================================================================

/// Split cell content into blocks and undo escaping
fn parse_content(raw: &str) -> Vec<String> {
    let mut blocks = vec![String::new()];
    let mut chars = raw.char_indices();
    while let Some((i, ch)) = chars.next() {
        if ch == '\\' {
            if let Some((_, escaped)) = chars.next() {
                if let Some(block) = blocks.last_mut() {
                    block.push(escaped);
                }
            }
        } else if raw[i..].starts_with(PARBREAK) {
            // Skip the rest of the separator
            for _ in 1..PARBREAK.len() {
                chars.next();
            }
            blocks.push(String::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push(ch);
        }
    }
    blocks
}

fn parse_cell(args: Option<&str>, content: &str) -> CellData {
    let mut cell = CellData {
        content: parse_content(content),
        ..CellData::default()
    };
    for caps in NAMED_ARG_RE.captures_iter(args.unwrap_or("")) {
        let Ok(value) = caps[2].parse::<usize>() else {
            continue;
        };
        match canonical_attribute(&caps[1]) {
            Some(COLSPAN) => cell.colspan = value,
            Some(ROWSPAN) => cell.rowspan = value,
            _ => {}
        }
    }
    cell
}

fn parse_row(line: &str) -> RowData {
    RowData {
        cells: CELL_RE
            .captures_iter(line)
            .map(|caps| {
                parse_cell(
                    caps.get(1).map(|m| m.as_str()),
                    caps.get(2).map(|m| m.as_str()).unwrap_or(""),
                )
            })
            .collect(),
    }
}

/// Read a row-per-line `#table(...)` back into exchange data.
///
/// Rows that end before the declared `columns:` count get empty cells, so
/// trailing empty columns survive. An `// empty row` line stands for a row
/// covered entirely by rowspans from above.
pub fn typst_to_table(input: &str) -> TableResult<TableData> {
    let mut lines = input.lines().map(str::trim);
    if !lines.any(|line| line.starts_with("#table(") || line.starts_with("table(")) {
        return Err(TableError::invalid("no #table( found in Typst input"));
    }

    let mut data = TableData::default();
    let mut in_header = false;
    let mut closed = false;

    for line in lines {
        if line.is_empty() {
            continue;
        }
        if line == EMPTY_ROW {
            if in_header {
                data.heading_rows += 1;
            }
            data.rows.push(RowData::default());
            continue;
        }
        if let Some(caps) = HEADING_COLUMNS_RE.captures(line) {
            data.heading_columns = caps[1].parse().unwrap_or(0);
            continue;
        }
        if line.starts_with("//") || COLUMNS_RE.is_match(line) {
            continue;
        }
        if line.starts_with("table.header(") {
            in_header = true;
            continue;
        }
        if line == ")," || line == ")" {
            if in_header {
                in_header = false;
                continue;
            }
            closed = true;
            break;
        }

        let row = parse_row(line);
        if row.cells.is_empty() {
            return Err(TableError::invalid(format!("cannot read table row: {line}")));
        }
        if in_header {
            data.heading_rows += 1;
        }
        data.rows.push(row);
    }

    if !closed {
        return Err(TableError::invalid("unterminated #table("));
    }
    if let Some(columns) = declared_columns(input) {
        pad_to_columns(&mut data.rows, columns);
    }
    Ok(data)
}

/// Append empty cells to rows that end before `columns`.
///
/// Walks the rows like the grid projection does, so slots covered by a
/// rowspan from above are not padded.
fn pad_to_columns(rows: &mut [RowData], columns: usize) {
    // Rows each column stays covered for, below the current row
    let mut covered: Vec<usize> = Vec::new();
    let is_covered = |covered: &[usize], column: usize| covered.get(column).is_some_and(|&n| n > 0);
    for row in rows.iter_mut() {
        let mut column = 0;
        let mut claims = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            while is_covered(&covered, column) {
                column += 1;
            }
            let colspan = cell.colspan.max(1);
            claims.push((column, colspan, cell.rowspan.max(1)));
            column += colspan;
        }

        let missing = (column..columns)
            .filter(|&c| !is_covered(&covered, c))
            .count();
        row.cells
            .extend(std::iter::repeat_with(|| CellData::new("")).take(missing));

        for n in covered.iter_mut() {
            *n = n.saturating_sub(1);
        }
        for (start, colspan, rowspan) in claims {
            if covered.len() < start + colspan {
                covered.resize(start + colspan, 0);
            }
            for n in &mut covered[start..start + colspan] {
                *n = (*n).max(rowspan - 1);
            }
        }
    }
}

/// Declared column count of a `#table(...)`, if any
pub fn declared_columns(input: &str) -> Option<usize> {
    input.lines().map(str::trim).find_map(|line| {
        let caps = COLUMNS_RE.captures(line)?;
        if let Some(n) = caps.get(1) {
            return n.as_str().parse().ok();
        }
        caps.get(2)
            .map(|tuple| tuple.as_str().split(',').filter(|s| !s.trim().is_empty()).count())
    })
}
