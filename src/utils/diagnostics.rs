//! Table diagnostics
//!
//! Lists the ways a table departs from a well-formed grid without touching
//! it. The post-fixers repair everything reported here; the diagnostics are
//! meant for inspecting content that arrived from outside (paste, files)
//! before it is normalized.
//!
//! ## Example
//!
//! ```rust
//! use tablegrid::{Document, TableData, TableOptions};
//! use tablegrid::diagnostics::check_table;
//!
//! let mut doc = Document::with_options(TableOptions::raw());
//! let table = TableData::from_texts(&[&["A", "B"], &["C"]])
//!     .insert_into(&mut doc, 0)
//!     .unwrap();
//!
//! let result = check_table(&doc, table).unwrap();
//! assert!(result.has_errors());
//! ```

use std::fmt;

use crate::core::table::{heading_columns, heading_rows, TableGrid, MAX_SPAN};
use crate::core::tree::{Document, NodeId, NodeKind};
use crate::data::constants::{COLSPAN, HEADING_COLUMNS, HEADING_ROWS, ROWSPAN};
use crate::utils::error::TableResult;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational note
    Info,
    /// Warning - the value is read leniently but is not what was written
    Warning,
    /// Error - the grid is not a rectangle as stored
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level
    pub level: DiagnosticLevel,
    /// Human-readable message
    pub message: String,
    /// Logical row (0-indexed)
    pub row: Option<usize>,
    /// Logical column (0-indexed)
    pub column: Option<usize>,
    /// Node the diagnostic is about
    pub node: Option<NodeId>,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            row: None,
            column: None,
            node: None,
            suggestion: None,
        }
    }

    /// Add grid location
    pub fn with_location(mut self, row: usize, column: usize) -> Self {
        self.row = Some(row);
        self.column = Some(column);
        self
    }

    /// Add a row without a column
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: level: message
        //         --> row 2, column 1 (node #14)
        //         = help: suggestion

        write!(f, "{}: {}", self.level, self.message)?;

        match (self.row, self.column) {
            (Some(row), Some(column)) => write!(f, "\n  --> row {}, column {}", row, column)?,
            (Some(row), None) => write!(f, "\n  --> row {}", row)?,
            _ => {}
        }
        if let Some(node) = self.node {
            write!(f, " ({})", node)?;
        }

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  = help: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Check result with summary
#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of info messages
    pub infos: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.diagnostics.push(diag);
    }

    /// Append every diagnostic of another result
    pub fn extend(&mut self, other: CheckResult) {
        for diag in other.diagnostics {
            self.add(diag);
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Check if there are any issues at all
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.errors > 0 {
            parts.push(format!(
                "{} error{}",
                self.errors,
                if self.errors == 1 { "" } else { "s" }
            ));
        }
        if self.warnings > 0 {
            parts.push(format!(
                "{} warning{}",
                self.warnings,
                if self.warnings == 1 { "" } else { "s" }
            ));
        }
        if self.infos > 0 {
            parts.push(format!(
                "{} note{}",
                self.infos,
                if self.infos == 1 { "" } else { "s" }
            ));
        }
        if parts.is_empty() {
            "no issues found".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Check one table for departures from a well-formed grid
pub fn check_table(doc: &Document, table: NodeId) -> TableResult<CheckResult> {
    doc.expect_kind(table, NodeKind::Table)?;
    let grid = TableGrid::project(doc, table);
    let mut result = CheckResult::new();

    if grid.row_count() == 0 || grid.column_count() == 0 {
        result.add(
            Diagnostic::new(DiagnosticLevel::Error, "table has no cells")
                .with_node(table)
                .with_suggestion("a single empty cell will be created"),
        );
        return Ok(result);
    }

    check_spans(doc, &grid, &mut result);
    check_row_widths(&grid, &mut result);
    check_headings(doc, &grid, &mut result);
    check_content(doc, &grid, &mut result);

    Ok(result)
}

/// Check every table of the document
pub fn check_document(doc: &Document) -> TableResult<CheckResult> {
    let mut result = CheckResult::new();
    for table in doc.tables() {
        result.extend(check_table(doc, table)?);
    }
    Ok(result)
}

/// Unreadable, overlapping and overflowing spans
fn check_spans(doc: &Document, grid: &TableGrid, result: &mut CheckResult) {
    for slot in grid.cells() {
        for name in [COLSPAN, ROWSPAN] {
            let Some(value) = doc.attribute(slot.cell, name) else {
                continue;
            };
            match value.as_count() {
                Some(0) | None => result.add(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!("{name} {value} is not a positive number"),
                    )
                    .with_location(slot.row, slot.column)
                    .with_node(slot.cell)
                    .with_suggestion("the attribute is read as 1"),
                ),
                Some(n) if n > MAX_SPAN => result.add(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!("{name} {n} is larger than {MAX_SPAN}"),
                    )
                    .with_location(slot.row, slot.column)
                    .with_node(slot.cell),
                ),
                Some(_) => {}
            }
        }
    }

    for slot in grid.overlapping() {
        result.add(
            Diagnostic::new(
                DiagnosticLevel::Error,
                format!(
                    "cell spanning {}x{} overlaps an earlier cell",
                    slot.rowspan, slot.colspan
                ),
            )
            .with_location(slot.row, slot.column)
            .with_node(slot.cell)
            .with_suggestion("the cell's spans will be reduced to the free area"),
        );
    }

    for slot in grid.overflowing() {
        result.add(
            Diagnostic::new(
                DiagnosticLevel::Error,
                format!(
                    "rowspan {} runs past the last row ({} rows available)",
                    slot.declared_rowspan, slot.rowspan
                ),
            )
            .with_location(slot.row, slot.column)
            .with_node(slot.cell)
            .with_suggestion(format!("set rowspan to {}", slot.rowspan)),
        );
    }
}

/// Rows covering fewer slots than the table is wide
fn check_row_widths(grid: &TableGrid, result: &mut CheckResult) {
    let columns = grid.column_count();
    for row in 0..grid.row_count() {
        let width = grid.row_width(row);
        if width < columns {
            let missing = columns - width;
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Error,
                    format!("row covers {} of {} columns", width, columns),
                )
                .with_row(row)
                .with_suggestion(format!(
                    "{} empty cell{} will be appended",
                    missing,
                    if missing == 1 { "" } else { "s" }
                )),
            );
        }
    }
}

/// Heading counts out of range or splitting a cell
fn check_headings(doc: &Document, grid: &TableGrid, result: &mut CheckResult) {
    let table = grid.table();
    let checks = [
        (HEADING_ROWS, heading_rows(doc, table), grid.row_count(), "rows"),
        (
            HEADING_COLUMNS,
            heading_columns(doc, table),
            grid.column_count(),
            "columns",
        ),
    ];

    for (name, count, size, what) in checks {
        if let Some(value) = doc.attribute(table, name) {
            if value.as_count().filter(|&n| n > 0).is_none() {
                result.add(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        format!("{name} {value} is not a positive number"),
                    )
                    .with_node(table)
                    .with_suggestion("the attribute will be removed"),
                );
            }
        }
        if count > size {
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Error,
                    format!("{name} is {count} but the table has {size} {what}"),
                )
                .with_node(table)
                .with_suggestion(format!("set {name} to {size}")),
            );
        }
    }

    let rows = heading_rows(doc, table).min(grid.row_count());
    let columns = heading_columns(doc, table).min(grid.column_count());
    for slot in grid.cells() {
        if rows > 0 && slot.row < rows && rows < slot.row_end() {
            result.add(
                Diagnostic::new(DiagnosticLevel::Error, "cell crosses the heading rows boundary")
                    .with_location(slot.row, slot.column)
                    .with_node(slot.cell)
                    .with_suggestion(format!("the cell will be split below row {}", rows - 1)),
            );
        }
        if columns > 0 && slot.column < columns && columns < slot.column_end() {
            result.add(
                Diagnostic::new(
                    DiagnosticLevel::Error,
                    "cell crosses the heading columns boundary",
                )
                .with_location(slot.row, slot.column)
                .with_node(slot.cell)
                .with_suggestion(format!(
                    "the cell will be split right of column {}",
                    columns - 1
                )),
            );
        }
    }
}

/// Cells without any content block
fn check_content(doc: &Document, grid: &TableGrid, result: &mut CheckResult) {
    for slot in grid.cells() {
        if doc.children(slot.cell).is_empty() {
            result.add(
                Diagnostic::new(DiagnosticLevel::Info, "cell has no paragraph")
                    .with_location(slot.row, slot.column)
                    .with_node(slot.cell),
            );
        }
    }
}

/// Format check results for terminal output
pub fn format_diagnostics(result: &CheckResult, use_color: bool) -> String {
    let mut output = String::new();

    for diag in &result.diagnostics {
        if use_color {
            let color = match diag.level {
                DiagnosticLevel::Error => "\x1b[31m",   // Red
                DiagnosticLevel::Warning => "\x1b[33m", // Yellow
                DiagnosticLevel::Info => "\x1b[34m",    // Blue
            };
            output.push_str(color);
            output.push_str(&format!("{}", diag));
            output.push_str("\x1b[0m\n\n");
        } else {
            output.push_str(&format!("{}\n\n", diag));
        }
    }

    // Summary
    if use_color {
        if result.has_errors() {
            output.push_str("\x1b[31m");
        } else if result.warnings > 0 {
            output.push_str("\x1b[33m");
        } else {
            output.push_str("\x1b[32m");
        }
    }

    output.push_str(&format!("Summary: {}", result.summary()));

    if use_color {
        output.push_str("\x1b[0m");
    }

    output
}
