use super::model::{CellValue, Column, ColumnType, Table, column_type_of};

// ---------------------------------------------------------------------------
// Table pass
// ---------------------------------------------------------------------------

/// Run numeric adoption and type refinement over every column, in place.
pub fn coerce_table(table: &mut Table) {
    for column in table.columns_mut() {
        let before = column.dtype;
        let adopted = coerce_numeric(column);
        refine_column(column);
        log::debug!(
            "column '{}': {before} -> {} (numeric adopted: {adopted})",
            column.name,
            column.dtype
        );
    }
}

// ---------------------------------------------------------------------------
// Numeric adoption
// ---------------------------------------------------------------------------

/// Reinterpret a text column as numeric when every present cell parses.
///
/// All-or-nothing: a single unparseable cell leaves the column untouched.
/// Missing and empty cells are skipped by the check and come out as `Null`.
/// Returns whether the column was converted.
pub fn coerce_numeric(column: &mut Column) -> bool {
    if column.dtype != ColumnType::Text {
        return false;
    }

    let parsed: Vec<Option<CellValue>> = column
        .cells
        .iter()
        .map(|cell| match cell {
            CellValue::Null => Some(CellValue::Null),
            CellValue::Text(s) if s.is_empty() => Some(CellValue::Null),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        })
        .collect();

    if !parsed.iter().all(Option::is_some) {
        return false;
    }

    column.cells = parsed.into_iter().flatten().collect();
    column.dtype = column_type_of(&column.cells);
    true
}

/// Parse a numeric literal: optional sign, digits, decimal point, exponent.
///
/// Anything that fits an `i64` is an integer. Otherwise the literal must be
/// a finite `f64` containing at least one digit, which keeps words such as
/// `inf` or `NaN` and overflowing exponents out.
pub fn parse_number(s: &str) -> Option<CellValue> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(CellValue::Integer(i));
    }
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(CellValue::Float)
}

// ---------------------------------------------------------------------------
// Refinement
// ---------------------------------------------------------------------------

/// Narrow a column to the tightest type that holds every present value.
///
/// * numeric columns become `Integer` when every value is integral and in
///   `i64` range, otherwise `Float`
/// * text columns made only of `true`/`false` literals become `Boolean`
/// * everything else keeps its type
pub fn refine_column(column: &mut Column) {
    match column.dtype {
        ColumnType::Integer | ColumnType::Float => refine_numeric(column),
        ColumnType::Text => refine_boolean(column),
        ColumnType::Unset | ColumnType::Boolean => {}
    }
    column.dtype = column_type_of(&column.cells);
}

fn refine_numeric(column: &mut Column) {
    let integral = column.cells.iter().all(|cell| match cell {
        CellValue::Float(v) => as_exact_i64(*v).is_some(),
        _ => true,
    });

    for cell in &mut column.cells {
        let narrowed = match cell {
            CellValue::Float(v) if integral => as_exact_i64(*v).map(CellValue::Integer),
            CellValue::Integer(i) if !integral => Some(CellValue::Float(*i as f64)),
            _ => None,
        };
        if let Some(value) = narrowed {
            *cell = value;
        }
    }
}

fn refine_boolean(column: &mut Column) {
    let literals: Option<Vec<Option<bool>>> = column
        .cells
        .iter()
        .map(|cell| match cell {
            CellValue::Null => Some(None),
            CellValue::Text(s) => parse_bool(s).map(Some),
            _ => None,
        })
        .collect();

    if let Some(literals) = literals {
        column.cells = literals
            .into_iter()
            .map(|b| b.map_or(CellValue::Null, CellValue::Bool))
            .collect();
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn as_exact_i64(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
