//! Feature modules - formats around the table model
//!
//! - `exchange`: the serializable table shape used for paste and I/O
//! - `typst`: Typst `#table(...)` presentation mapping

pub mod exchange;
pub mod typst;

// Re-export commonly used types
pub use exchange::{CellData, RowData, TableData};
pub use typst::{document_to_typst, table_to_typst, typst_to_table};
