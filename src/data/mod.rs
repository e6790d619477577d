//! Data layer - Static names and constants
//!
//! This module contains the static data shared by the table model:
//! - Model attribute names
//! - Alias spellings accepted from external sources

pub mod constants;

// Re-export commonly used items
pub use constants::{
    canonical_attribute, ATTRIBUTE_ALIASES, COLSPAN, DEFAULT_SPAN, HEADING_COLUMNS, HEADING_ROWS,
    ROWSPAN,
};
