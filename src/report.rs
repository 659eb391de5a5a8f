use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use clap::builder::PossibleValue;
use serde::Serialize;

use crate::data::model::{ColumnType, Table};
use crate::store::verify::Verification;
use crate::store::writer::IfExists;

// ---------------------------------------------------------------------------
// Import report
// ---------------------------------------------------------------------------

/// Inferred type of one loaded column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: ColumnType,
}

/// Everything an import run reports once it has finished.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub csv: String,
    pub db: String,
    pub if_exists: IfExists,
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub rows_written: usize,
    pub verification: Verification,
}

impl ImportReport {
    pub fn new(
        csv: &Path,
        db: &Path,
        if_exists: IfExists,
        table: &Table,
        rows_written: usize,
        verification: Verification,
    ) -> Self {
        Self {
            csv: csv.display().to_string(),
            db: db.display().to_string(),
            if_exists,
            rows: table.len(),
            columns: table
                .columns()
                .iter()
                .map(|c| ColumnSummary {
                    name: c.name.clone(),
                    dtype: c.dtype,
                })
                .collect(),
            rows_written,
            verification,
        }
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Human-readable summary: dtypes, write confirmation, schema, row count.
impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.verification;
        let policy = self.if_exists.to_possible_value();
        let policy = policy.as_ref().map_or("", PossibleValue::get_name);

        writeln!(
            f,
            "Rows: {} | Columns: {}",
            with_thousands(self.rows as u64),
            self.columns.len()
        )?;
        writeln!(f, "Inferred dtypes:")?;
        for col in &self.columns {
            writeln!(f, "  - {}: {}", col.name, col.dtype)?;
        }
        writeln!(
            f,
            "Wrote SQLite DB: {} (table: {}, {} rows, if-exists: {policy})",
            self.db,
            v.table,
            with_thousands(self.rows_written as u64)
        )?;
        writeln!(f, "\nTable schema (name, type):")?;
        for col in &v.columns {
            writeln!(f, "  - {}: {}", col.name, col.decl_type)?;
        }
        writeln!(
            f,
            "\nRow count in table '{}': {}",
            v.table,
            with_thousands(v.row_count)
        )?;
        write!(f, "Done.")
    }
}

/// `1234567` → `1,234,567`.
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
