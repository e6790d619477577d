//! Options for the table engine

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Table engine options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableOptions {
    /// Whether post-fixers run when a transaction commits
    pub run_post_fixers: bool,
    /// Upper bound on fixer rounds per transaction
    pub max_fix_rounds: usize,
    /// Whether committed transactions are kept for undo
    pub record_history: bool,
    /// Number of undo steps kept
    pub history_limit: usize,
    /// Row count used when a table is created with zero rows
    pub default_rows: usize,
    /// Column count used when a table is created with zero columns
    pub default_columns: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            run_post_fixers: true,
            max_fix_rounds: 16,
            record_history: true,
            history_limit: 100,
            default_rows: 2,
            default_columns: 2,
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with post-fixers disabled.
    ///
    /// Edits are applied exactly as issued, which is how content arrives
    /// from outside the engine (paste, collaborative sync).
    pub fn raw() -> Self {
        Self {
            run_post_fixers: false,
            ..Default::default()
        }
    }

    /// Options without an undo history
    pub fn no_history() -> Self {
        Self {
            record_history: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(TableOptions::default().run_post_fixers);
        assert!(!TableOptions::raw().run_post_fixers);
        assert!(TableOptions::raw().record_history);
        assert!(!TableOptions::no_history().record_history);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: TableOptions = serde_json::from_str(r#"{ "max_fix_rounds": 4 }"#).unwrap();
        assert_eq!(opts.max_fix_rounds, 4);
        assert_eq!(opts.history_limit, 100);
        assert!(opts.run_post_fixers);
    }
}
