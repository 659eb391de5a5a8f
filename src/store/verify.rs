use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use super::quote_ident;

/// A column as SQLite declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
}

/// Schema and row count read back after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: u64,
}

/// Re-open `db_path` read-only and read back `table_name`'s schema and size.
pub fn verify_table(db_path: &Path, table_name: &str) -> Result<Verification> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("re-opening database {}", db_path.display()))?;

    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))
        .context("reading table schema")?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                decl_type: row.get(2)?,
            })
        })
        .context("reading table schema")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("reading table schema")?;

    if columns.is_empty() {
        bail!("table '{table_name}' not found in {}", db_path.display());
    }

    let row_count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table_name)),
            [],
            |row| row.get(0),
        )
        .with_context(|| format!("counting rows of '{table_name}'"))?;

    Ok(Verification {
        table: table_name.to_string(),
        columns,
        row_count: row_count as u64,
    })
}
