use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::ImportError;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// The loader only produces `Text` and `Null`; the coercion pass rewrites
/// cells into the typed variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The narrowest column type able to hold this single value.
    pub fn column_type(&self) -> ColumnType {
        match self {
            CellValue::Null => ColumnType::Unset,
            CellValue::Bool(_) => ColumnType::Boolean,
            CellValue::Integer(_) => ColumnType::Integer,
            CellValue::Float(_) => ColumnType::Float,
            CellValue::Text(_) => ColumnType::Text,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnType – the inferred semantic type of a column
// ---------------------------------------------------------------------------

/// Semantic column type, ordered `Unset < Boolean < Integer < Float < Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Unset,
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// Least type holding values of both `self` and `other`.
    ///
    /// Widening is conservative: only `Integer` widens into `Float`, every
    /// other mixture of distinct types falls through to `Text`.
    pub fn join(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (Unset, t) | (t, Unset) => t,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }

    /// SQLite declared type used when creating the column.
    pub fn storage_class(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Boolean | ColumnType::Text | ColumnType::Unset => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Unset => "unset",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub cells: Vec<CellValue>,
}

impl Column {
    /// Build a column whose type is the join of its cells' types.
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let dtype = column_type_of(&cells);
        Column {
            name: name.into(),
            dtype,
            cells,
        }
    }
}

/// Join of every cell's type; `Unset` for an empty or all-null slice.
pub fn column_type_of(cells: &[CellValue]) -> ColumnType {
    cells
        .iter()
        .map(CellValue::column_type)
        .fold(ColumnType::Unset, ColumnType::join)
}

/// Comparison key for column names. SQLite folds ASCII case in identifiers.
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// The full in-memory table: columns in header order, uniform row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Assemble a table, checking name uniqueness and uniform length.
    ///
    /// Names are compared by [`name_key`], so `Team` and `team` collide.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, ImportError> {
        let row_count = columns.first().map_or(0, |c| c.cells.len());
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(name_key(&col.name)) {
                return Err(ImportError::DuplicateColumn(col.name.clone()));
            }
            if col.cells.len() != row_count {
                return Err(ImportError::RaggedColumns {
                    name: col.name.clone(),
                    expected: row_count,
                    found: col.cells.len(),
                });
            }
        }
        Ok(Table { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access for in-place type passes. Cell counts must not change.
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.cells[index])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
