use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;

use super::coerce::coerce_table;
use super::model::{CellValue, Column, Table, name_key};
use crate::error::ImportError;

/// Cell contents treated as a missing value, besides the empty string.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reader settings for delimited input.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a CSV file and run the type coercion pass over every column.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let mut table = load_csv(path, options)?;
    coerce_table(&mut table);
    Ok(table)
}

/// Read a CSV file fully into a [`Table`] of raw text cells.
///
/// The first record is the header. Short records are padded with missing
/// cells; a record longer than the header is rejected.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let headers = unique_headers(reader.headers().context("reading CSV headers")?);
    let width = headers.len();
    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); width];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > width {
            let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
            return Err(ImportError::RaggedRecord {
                line,
                expected: width,
                found: record.len(),
            }
            .into());
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(parse_cell(record.get(col_idx).unwrap_or("")));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    let table = Table::from_columns(columns)?;
    log::info!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_cell(s: &str) -> CellValue {
    if s.is_empty() || NA_TOKENS.contains(&s) {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

/// Name blank headers `Unnamed: {i}` and suffix repeats as `name.1`, `name.2`, ...
///
/// Repeats are detected ignoring ASCII case, matching how SQLite compares
/// column names.
fn unique_headers(raw: &StringRecord) -> Vec<String> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, header) in raw.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name_key(&name)) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        taken.insert(name_key(&name));
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::ColumnType;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_header_order_and_rows() {
        let file = write_csv("b,a,c\n1,x,\n2,y,z\n");
        let table = load_csv(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(table.len(), 2);
        let c = table.column("c").unwrap();
        assert_eq!(c.cells, vec![CellValue::Null, CellValue::Text("z".into())]);
        assert_eq!(c.dtype, ColumnType::Text);
    }

    #[test]
    fn na_tokens_load_as_null() {
        let file = write_csv("v\nNA\nnull\n\nN/A\nNaN\n");
        let table = load_csv(file.path(), &LoadOptions::default()).unwrap();
        let v = table.column("v").unwrap();
        assert!(v.cells.iter().all(CellValue::is_null));
        assert_eq!(v.dtype, ColumnType::Unset);
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let file = write_csv("a,a,,a\n1,2,3,4\n");
        let table = load_csv(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            ["a", "a.1", "Unnamed: 2", "a.2"]
        );
    }

    #[test]
    fn headers_differing_only_in_case_are_renamed() {
        let file = write_csv("Team,team,TEAM.1\nA,b,c\n");
        let table = load_csv(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            ["Team", "team.1", "TEAM.1.1"]
        );
    }

    #[test]
    fn case_colliding_headers_write_cleanly() {
        use crate::store::verify::verify_table;
        use crate::store::writer::{IfExists, write_table};

        let dir = tempfile::tempdir().unwrap();
        let file = write_csv("Team,team\n1,x\n");
        let table = load_table(file.path(), &LoadOptions::default()).unwrap();
        let db = dir.path().join("out.db");
        write_table(&table, &db, "plays", IfExists::Replace).unwrap();
        let v = verify_table(&db, "plays").unwrap();
        let names: Vec<&str> = v.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Team", "team.1"]);
    }

    #[test]
    fn short_records_are_padded() {
        let file = write_csv("a,b,c\n1,2\n");
        let table = load_csv(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.column("c").unwrap().cells, vec![CellValue::Null]);
    }

    #[test]
    fn long_records_are_rejected() {
        let file = write_csv("a,b\n1,2\n1,2,3\n");
        let err = load_csv(file.path(), &LoadOptions::default()).unwrap_err();
        let err = err.downcast::<ImportError>().expect("import error");
        assert!(matches!(
            err,
            ImportError::RaggedRecord { line: 3, expected: 2, found: 3 }
        ));
    }

    #[test]
    fn custom_delimiter() {
        let file = write_csv("a;b\n1;x\n");
        let table = load_table(file.path(), &LoadOptions { delimiter: b';' }).unwrap();
        assert_eq!(table.column("a").unwrap().dtype, ColumnType::Integer);
        assert_eq!(table.column("b").unwrap().dtype, ColumnType::Text);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_csv(&dir.path().join("nope.csv"), &LoadOptions::default()).is_err());
    }
}
