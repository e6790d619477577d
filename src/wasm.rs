//! WASM bindings for tablegrid
//!
//! Tables cross the boundary as exchange JSON strings.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::diagnostics::{check_table, CheckResult};
#[cfg(feature = "wasm")]
use crate::{Document, TableData, TableOptions, TableResult};

/// Operation result with additional metadata
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct TableOutput {
    /// The produced JSON or markup
    pub output: String,
    /// Whether the operation was successful
    pub success: bool,
    /// Error message if the operation failed
    pub error: Option<String>,
}

#[cfg(feature = "wasm")]
impl From<TableResult<String>> for TableOutput {
    fn from(result: TableResult<String>) -> Self {
        match result {
            Ok(output) => TableOutput {
                output,
                success: true,
                error: None,
            },
            Err(err) => TableOutput {
                output: String::new(),
                success: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// One diagnostic as seen from JavaScript
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct DiagnosticJs {
    pub level: String,
    pub message: String,
    pub row: Option<usize>,
    pub column: Option<usize>,
    pub suggestion: Option<String>,
}

/// Check report as seen from JavaScript
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct CheckReport {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub summary: String,
    pub diagnostics: Vec<DiagnosticJs>,
    /// Set when the input could not be read at all
    pub error: Option<String>,
}

#[cfg(feature = "wasm")]
impl From<CheckResult> for CheckReport {
    fn from(result: CheckResult) -> Self {
        CheckReport {
            errors: result.errors,
            warnings: result.warnings,
            infos: result.infos,
            summary: result.summary(),
            diagnostics: result
                .diagnostics
                .into_iter()
                .map(|d| DiagnosticJs {
                    level: d.level.to_string(),
                    message: d.message,
                    row: d.row,
                    column: d.column,
                    suggestion: d.suggestion,
                })
                .collect(),
            error: None,
        }
    }
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Repair a table given as exchange JSON
///
/// # Returns
/// `{ output, success, error }` where `output` is the normalized JSON
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "normalizeTable")]
pub fn normalize_table_wasm(input: &str) -> JsValue {
    let result = TableOutput::from(crate::normalize_json(input));
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Render a table given as exchange JSON as Typst markup
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "renderTypst")]
pub fn render_typst_wasm(input: &str) -> JsValue {
    let result = TableOutput::from(crate::json_to_typst(input));
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Read Typst `#table(...)` markup into exchange JSON
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "importTypst")]
pub fn import_typst_wasm(input: &str) -> JsValue {
    let result = TableOutput::from(crate::typst_to_json(input));
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// List invariant violations of a table given as exchange JSON, as stored
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "checkTable")]
pub fn check_table_wasm(input: &str) -> JsValue {
    let checked = TableData::from_json(input).and_then(|data| {
        let mut doc = Document::with_options(TableOptions::raw());
        let table = data.insert_into(&mut doc, 0)?;
        check_table(&doc, table)
    });

    let report = match checked {
        Ok(result) => CheckReport::from(result),
        Err(err) => CheckReport {
            errors: 1,
            warnings: 0,
            infos: 0,
            summary: err.to_string(),
            diagnostics: Vec::new(),
            error: Some(err.to_string()),
        },
    };
    serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
}

/// Get library version
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
