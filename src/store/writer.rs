use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, Transaction, params_from_iter};
use serde::Serialize;

use super::quote_ident;
use crate::data::model::{CellValue, Table};
use crate::error::ImportError;

/// What to do when the destination table already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Drop the existing table and create it again.
    #[default]
    Replace,
    /// Abort with an error.
    Fail,
    /// Keep the existing table and add rows to it.
    Append,
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            CellValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            CellValue::Bool(b) => {
                let text: &'static [u8] = if *b { b"true" } else { b"false" };
                ToSqlOutput::Borrowed(ValueRef::Text(text))
            }
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write `table` into `db_path` as `table_name`, in one transaction.
///
/// Missing parent directories of `db_path` are created first. Returns the
/// number of rows inserted.
pub fn write_table(
    table: &Table,
    db_path: &Path,
    table_name: &str,
    if_exists: IfExists,
) -> Result<usize> {
    if table.width() == 0 {
        bail!("CSV has no columns; nothing to write");
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let tx = conn.transaction().context("starting transaction")?;

    let exists = table_exists(&tx, table_name)?;
    match (if_exists, exists) {
        (IfExists::Fail, true) => return Err(ImportError::TableExists(table_name.into()).into()),
        (IfExists::Append, true) => {
            log::info!("Appending to existing table '{table_name}'");
        }
        (IfExists::Replace, true) => {
            log::info!("Replacing existing table '{table_name}'");
            tx.execute(&format!("DROP TABLE {}", quote_ident(table_name)), [])
                .with_context(|| format!("dropping table '{table_name}'"))?;
            create_table(&tx, table, table_name)?;
        }
        (_, false) => create_table(&tx, table, table_name)?,
    }

    let inserted = insert_rows(&tx, table, table_name)?;
    tx.commit().context("committing import")?;

    log::info!("Wrote {inserted} rows to '{table_name}' in {}", db_path.display());
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// SQLite resolves table names case-insensitively, so the lookup does too.
fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table_name],
            |row| row.get(0),
        )
        .context("looking up existing tables")?;
    Ok(count > 0)
}

fn create_table(tx: &Transaction<'_>, table: &Table, table_name: &str) -> Result<()> {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.dtype.storage_class()))
        .collect();
    let sql = format!(
        "CREATE TABLE {} ({})",
        quote_ident(table_name),
        columns.join(", ")
    );
    log::debug!("{sql}");
    tx.execute(&sql, [])
        .with_context(|| format!("creating table '{table_name}'"))?;
    Ok(())
}

fn insert_rows(tx: &Transaction<'_>, table: &Table, table_name: &str) -> Result<usize> {
    let names: Vec<String> = table.column_names().map(quote_ident).collect();
    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        quote_ident(table_name),
        names.join(", ")
    );

    let mut stmt = tx
        .prepare(&sql)
        .with_context(|| format!("preparing insert into '{table_name}'"))?;
    for row in 0..table.len() {
        stmt.execute(params_from_iter(table.row(row)))
            .with_context(|| format!("inserting row {row}"))?;
    }
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::store::verify::verify_table;

    fn sample_table() -> Table {
        Table::from_columns(vec![
            Column::new(
                "id",
                vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Null],
            ),
            Column::new(
                "yards",
                vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(-3.0)],
            ),
            Column::new(
                "scored",
                vec![CellValue::Bool(true), CellValue::Bool(false), CellValue::Null],
            ),
            Column::new(
                "team \"A\"",
                vec![
                    CellValue::Text("x".into()),
                    CellValue::Text("y".into()),
                    CellValue::Text("z".into()),
                ],
            ),
        ])
        .unwrap()
    }

    fn count(db: &Path, table: &str) -> i64 {
        let conn = Connection::open(db).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), [], |r| {
            r.get(0)
        })
        .unwrap()
    }

    #[test]
    fn creates_parent_directories_and_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/deeper/out.db");
        let written = write_table(&sample_table(), &db, "plays", IfExists::Replace).unwrap();
        assert_eq!(written, 3);
        assert_eq!(count(&db, "plays"), 3);
    }

    #[test]
    fn values_land_with_storage_classes() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "plays", IfExists::Replace).unwrap();

        let conn = Connection::open(&db).unwrap();
        let rows: Vec<(Option<i64>, Option<f64>, Option<String>, String)> = conn
            .prepare("SELECT id, yards, scored, \"team \"\"A\"\"\" FROM plays ORDER BY rowid")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (Some(1), Some(1.5), Some("true".into()), "x".into()),
                (Some(2), None, Some("false".into()), "y".into()),
                (None, Some(-3.0), None, "z".into()),
            ]
        );
    }

    #[test]
    fn replace_recreates_table_with_new_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "plays", IfExists::Replace).unwrap();

        let retyped = Table::from_columns(vec![
            Column::new("id", vec![CellValue::Text("a".into())]),
            Column::new("team \"A\"", vec![CellValue::Integer(7)]),
        ])
        .unwrap();
        write_table(&retyped, &db, "plays", IfExists::Replace).unwrap();

        let v = verify_table(&db, "plays").unwrap();
        let schema: Vec<(&str, &str)> = v
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.decl_type.as_str()))
            .collect();
        assert_eq!(schema, [("id", "TEXT"), ("team \"A\"", "INTEGER")]);
        assert_eq!(v.row_count, 1);
    }

    #[test]
    fn replace_matches_table_name_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "Plays", IfExists::Replace).unwrap();
        write_table(&sample_table(), &db, "plays", IfExists::Replace).unwrap();
        assert_eq!(count(&db, "plays"), 3);
    }

    #[test]
    fn fail_and_append_see_differently_cased_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "Plays", IfExists::Replace).unwrap();

        let err = write_table(&sample_table(), &db, "plays", IfExists::Fail).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::TableExists(name)) if name == "plays"
        ));

        write_table(&sample_table(), &db, "PLAYS", IfExists::Append).unwrap();
        assert_eq!(count(&db, "plays"), 6);
    }

    #[test]
    fn fail_refuses_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "plays", IfExists::Fail).unwrap();
        let err = write_table(&sample_table(), &db, "plays", IfExists::Fail).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::TableExists(name)) if name == "plays"
        ));
        assert_eq!(count(&db, "plays"), 3);
    }

    #[test]
    fn append_adds_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "plays", IfExists::Append).unwrap();
        write_table(&sample_table(), &db, "plays", IfExists::Append).unwrap();
        assert_eq!(count(&db, "plays"), 6);
    }

    #[test]
    fn other_tables_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.db");
        write_table(&sample_table(), &db, "keep", IfExists::Replace).unwrap();
        write_table(&sample_table(), &db, "plays", IfExists::Replace).unwrap();
        assert_eq!(count(&db, "keep"), 3);
    }
}
