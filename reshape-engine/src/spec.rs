//! FILENAME: reshape-engine/src/spec.rs
//! Specification builders - deriving the reshape description.
//!
//! A specification is an ordinary `Table` with two reserved text
//! columns, `name` and `value`, plus any number of key columns. Each
//! row describes one wide column: `name` is its literal column name,
//! `value` is the long-form variable its cells populate, and the key
//! columns carry the tuple identifying which long-form observation it
//! belongs to. Because the spec is plain data, callers are expected to
//! edit it between building and pivoting - rename keys, parse them
//! into richer types, filter rows out.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use table::{Column, ColumnSelector, ScalarValue, Table};
use crate::error::ReshapeError;
use crate::intern::KeyValue;
use crate::validate::SpecError;

/// Reserved spec column holding the wide-column name.
pub const NAME_COLUMN: &str = "name";

/// Reserved spec column holding the long-form variable name.
pub const VALUE_COLUMN: &str = "value";

/// Separator used when generating wide-column names.
pub const NAME_SEPARATOR: &str = "_";

// ============================================================================
// LONG SPEC BUILDER (wide -> long)
// ============================================================================

/// Derives a specification describing a wide→long reshape of `source`.
///
/// One spec row is produced per selected column: `name` is the column's
/// own name, `value` is `value_name`, and a single text key column
/// named `key_name` repeats the column's name as data. By default the
/// wide column name therefore becomes the key value verbatim; callers
/// typically post-process the key column (substring extraction, numeric
/// parsing) before pivoting.
pub fn build_long_spec(
    source: &Table,
    columns: &ColumnSelector,
    value_name: &str,
    key_name: &str,
) -> Result<Table, ReshapeError> {
    if value_name.is_empty() {
        return Err(SpecError::BadVariableName { name: value_name.to_string(), role: "value" }.into());
    }
    if key_name.is_empty() {
        return Err(SpecError::BadVariableName { name: key_name.to_string(), role: "key" }.into());
    }
    if value_name == key_name {
        return Err(SpecError::VariableNameClash { name: key_name.to_string() }.into());
    }
    // The key column sits next to the reserved columns in the spec table
    if key_name == NAME_COLUMN || key_name == VALUE_COLUMN {
        return Err(SpecError::VariableNameClash { name: key_name.to_string() }.into());
    }

    let selected = columns.resolve(source)?;

    let names: Vec<Option<String>> = selected.iter().map(|n| Some(n.clone())).collect();
    let values: Vec<Option<String>> =
        selected.iter().map(|_| Some(value_name.to_string())).collect();
    let keys = names.clone();

    let spec = Table::from_columns(vec![
        (NAME_COLUMN, Column::text(names)),
        (VALUE_COLUMN, Column::text(values)),
        (key_name, Column::text(keys)),
    ])?;
    Ok(spec)
}

// ============================================================================
// WIDE SPEC BUILDER (long -> wide)
// ============================================================================

/// Derives a specification describing a long→wide reshape of `source`.
///
/// The distinct combinations of values across `key_columns` are taken
/// in order of first occurrence in `source` (chosen over lexicographic
/// order so that appending source rows never reorders existing spec
/// rows). One spec row is emitted per combination × value column, with
/// a generated wide-column name: the combination's displayed values
/// joined with `_`, plus the value-column name when more than one value
/// column is given.
pub fn build_wide_spec(
    source: &Table,
    key_columns: &[&str],
    value_columns: &[&str],
) -> Result<Table, ReshapeError> {
    if key_columns.is_empty() || value_columns.is_empty() {
        return Err(table::SelectError::EmptySelection.into());
    }
    for name in key_columns.iter().chain(value_columns.iter()) {
        if !source.has_column(name) {
            return Err(table::SelectError::UnknownColumn(name.to_string()).into());
        }
    }
    for name in value_columns {
        if key_columns.contains(name) {
            return Err(SpecError::VariableNameClash { name: name.to_string() }.into());
        }
    }

    let key_cols: Vec<&Column> = key_columns
        .iter()
        .filter_map(|n| source.column(n))
        .collect();

    // Distinct key combinations, first-occurrence order. The tuple of
    // normalized values is the dedup key; the row index remembers where
    // the combination's literal values live.
    let mut seen: FxHashSet<SmallVec<[KeyValue; 4]>> = FxHashSet::default();
    let mut combo_rows: Vec<usize> = Vec::new();
    for row in 0..source.row_count() {
        let combo: SmallVec<[KeyValue; 4]> = key_cols
            .iter()
            .map(|c| KeyValue::from(&c.value(row)))
            .collect();
        if seen.insert(combo) {
            combo_rows.push(row);
        }
    }

    let many_values = value_columns.len() > 1;
    let mut names: Vec<Option<String>> = Vec::new();
    let mut values: Vec<Option<String>> = Vec::new();
    let mut key_data: Vec<Vec<ScalarValue>> = vec![Vec::new(); key_cols.len()];

    for &row in &combo_rows {
        for value_column in value_columns {
            let mut parts: Vec<String> =
                key_cols.iter().map(|c| c.value(row).display()).collect();
            if many_values {
                parts.push(value_column.to_string());
            }
            names.push(Some(parts.join(NAME_SEPARATOR)));
            values.push(Some(value_column.to_string()));
            for (slot, col) in key_data.iter_mut().zip(key_cols.iter()) {
                slot.push(col.value(row));
            }
        }
    }

    let mut spec = Table::new();
    spec.push_column(NAME_COLUMN, Column::text(names))?;
    spec.push_column(VALUE_COLUMN, Column::text(values))?;
    for ((name, col), data) in key_columns.iter().zip(key_cols.iter()).zip(key_data) {
        spec.push_column(*name, Column::from_values(col.scalar_type(), data)?)?;
    }
    Ok(spec)
}

// ============================================================================
// TESTS
// ============================================================================
