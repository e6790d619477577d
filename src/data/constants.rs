//! Constants for the table model
//!
//! Attribute names shared by the model, the presentation mapping and the
//! exchange format, plus the alias table used when reading attributes that
//! come from outside the model (pasted markup, hand-written JSON).

use lazy_static::lazy_static;
use std::collections::HashMap;

// ============================================================================
// Model attribute names
// ============================================================================

/// Number of leading logical rows rendered as header (table attribute)
pub const HEADING_ROWS: &str = "headingRows";

/// Number of leading logical columns rendered as header (table attribute)
pub const HEADING_COLUMNS: &str = "headingColumns";

/// Number of logical columns a cell occupies (cell attribute)
pub const COLSPAN: &str = "colspan";

/// Number of logical rows a cell occupies (cell attribute)
pub const ROWSPAN: &str = "rowspan";

/// Value a span attribute has when it is absent
pub const DEFAULT_SPAN: usize = 1;

// ============================================================================
// Attribute aliases
// ============================================================================

lazy_static! {
    /// Spellings of the model attributes found in external sources, mapped
    /// to the canonical model name
    pub static ref ATTRIBUTE_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();

        m.insert("colspan", COLSPAN);
        m.insert("colSpan", COLSPAN);
        m.insert("col-span", COLSPAN);
        m.insert("gridSpan", COLSPAN);

        m.insert("rowspan", ROWSPAN);
        m.insert("rowSpan", ROWSPAN);
        m.insert("row-span", ROWSPAN);

        m.insert("headingRows", HEADING_ROWS);
        m.insert("heading_rows", HEADING_ROWS);
        m.insert("headerRows", HEADING_ROWS);

        m.insert("headingColumns", HEADING_COLUMNS);
        m.insert("heading_columns", HEADING_COLUMNS);
        m.insert("headerColumns", HEADING_COLUMNS);

        m
    };
}

/// Resolve an external attribute name to the model name
pub fn canonical_attribute(name: &str) -> Option<&'static str> {
    ATTRIBUTE_ALIASES.get(name).copied()
}
