//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Table diagnostics and reporting

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{check_document, check_table, format_diagnostics, CheckResult, Diagnostic, DiagnosticLevel};
pub use error::{MergeFailure, SplitFailure, TableError, TableResult};
