use std::path::PathBuf;

use thiserror::Error;

/// Domain failures of an import run.
///
/// I/O, CSV and SQLite plumbing errors travel as `anyhow::Error` with
/// context attached; these variants are the conditions the tool itself
/// detects and reports.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("line {line}: record has {found} fields but the header has {expected}")]
    RaggedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{name}' has {found} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
}
