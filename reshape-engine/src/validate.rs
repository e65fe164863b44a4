//! FILENAME: reshape-engine/src/validate.rs
//! Specification validation - the gate in front of the engine.
//!
//! `validate` checks a specification table for internal consistency and
//! produces an opaque `ValidatedSpec` that the engine accepts. Bad rows
//! are reported with their indices, never dropped or repaired. The
//! checks that need a concrete source table (column collisions with
//! retained columns, direction inference) live in the engine instead.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;
use table::{Column, ScalarType, ScalarValue, Table};
use crate::intern::KeyValue;
use crate::spec::{NAME_COLUMN, VALUE_COLUMN};

/// A violated specification invariant, with the offending rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    #[error("specification has no rows")]
    Empty,

    #[error("specification is missing the reserved '{column}' column")]
    MissingReserved { column: &'static str },

    #[error("reserved column '{column}' must be text, found {actual}")]
    ReservedNotText {
        column: &'static str,
        actual: ScalarType,
    },

    #[error("row {row}: '{column}' entry is missing or empty")]
    MissingEntry { column: &'static str, row: usize },

    #[error("rows {first_row} and {row} both describe wide column '{name}'")]
    DuplicateName {
        name: String,
        first_row: usize,
        row: usize,
    },

    #[error(
        "rows {first_row} and {row} both supply value variable '{value}' \
         for the same key tuple"
    )]
    DuplicateKeyValue {
        value: String,
        first_row: usize,
        row: usize,
    },

    #[error("row {row}: value variable '{value}' collides with a key column of the same name")]
    ValueCollidesWithKey { value: String, row: usize },

    #[error("'{name}' cannot be used as a {role} variable name")]
    BadVariableName { name: String, role: &'static str },

    #[error("'{name}' is claimed by more than one spec variable")]
    VariableNameClash { name: String },

    #[error("column '{column}' would collide with a retained source column of the same name")]
    RetainedCollision { column: String },
}

// ============================================================================
// VALIDATED SPEC
// ============================================================================

/// One parsed specification row.
#[derive(Debug, Clone)]
pub(crate) struct SpecRow {
    /// The wide-column name this row describes.
    pub name: String,

    /// The long-form variable its cells populate.
    pub value: String,

    /// Literal key-column values, in spec column order.
    pub key: Vec<ScalarValue>,
}

/// One key-tuple partition: the spec rows sharing a key tuple.
#[derive(Debug, Clone)]
pub(crate) struct Partition {
    /// The tuple's literal values, in spec key-column order.
    pub key: Vec<ScalarValue>,

    /// Indices into `ValidatedSpec::rows`, in spec order.
    pub entries: Vec<usize>,
}

/// A specification that has passed `validate`. Opaque to callers; the
/// engine reads the parsed rows, key columns, first-seen value order
/// and key-tuple partitions from it.
#[derive(Debug, Clone)]
pub struct ValidatedSpec {
    pub(crate) rows: Vec<SpecRow>,

    /// Key column names, in spec column order.
    pub(crate) key_columns: Vec<String>,

    /// Key column element types, parallel to `key_columns`.
    pub(crate) key_types: Vec<ScalarType>,

    /// Distinct value-variable names, in order of first appearance.
    pub(crate) value_order: Vec<String>,

    /// Key-tuple partitions, in order of first appearance.
    pub(crate) partitions: Vec<Partition>,
}

impl ValidatedSpec {
    /// Number of specification rows (wide-column identities).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The wide-column names, in spec order.
    pub fn wide_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    /// The distinct value-variable names, in first-seen order.
    pub fn value_names(&self) -> &[String] {
        &self.value_order
    }

    /// The key column names, in spec column order.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Number of distinct key tuples.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Checks `spec` for internal consistency and parses it into the form
/// the engine executes.
pub fn validate(spec: &Table) -> Result<ValidatedSpec, SpecError> {
    let name_col = reserved_text_column(spec, NAME_COLUMN)?;
    let value_col = reserved_text_column(spec, VALUE_COLUMN)?;

    if spec.row_count() == 0 {
        return Err(SpecError::Empty);
    }

    let key_columns: Vec<String> = spec
        .names()
        .iter()
        .filter(|n| *n != NAME_COLUMN && *n != VALUE_COLUMN)
        .cloned()
        .collect();
    let key_types: Vec<ScalarType> = key_columns
        .iter()
        .filter_map(|n| spec.column(n))
        .map(|c| c.scalar_type())
        .collect();
    let key_cols: Vec<&Column> = key_columns
        .iter()
        .filter_map(|n| spec.column(n))
        .collect();

    let mut rows: Vec<SpecRow> = Vec::with_capacity(spec.row_count());
    let mut seen_names: FxHashMap<String, usize> = FxHashMap::default();
    let mut seen_pairs: FxHashMap<(SmallVec<[KeyValue; 4]>, String), usize> =
        FxHashMap::default();
    let mut seen_tuples: FxHashMap<SmallVec<[KeyValue; 4]>, usize> = FxHashMap::default();
    let mut value_order: Vec<String> = Vec::new();
    let mut partitions: Vec<Partition> = Vec::new();

    for row in 0..spec.row_count() {
        let name = match name_col.value(row) {
            ScalarValue::Text(s) if !s.is_empty() => s,
            _ => return Err(SpecError::MissingEntry { column: NAME_COLUMN, row }),
        };
        let value = match value_col.value(row) {
            ScalarValue::Text(s) if !s.is_empty() => s,
            _ => return Err(SpecError::MissingEntry { column: VALUE_COLUMN, row }),
        };

        if let Some(&first_row) = seen_names.get(&name) {
            return Err(SpecError::DuplicateName { name, first_row, row });
        }
        seen_names.insert(name.clone(), row);

        if key_columns.iter().any(|k| *k == value) {
            return Err(SpecError::ValueCollidesWithKey { value, row });
        }

        let key: Vec<ScalarValue> = key_cols.iter().map(|c| c.value(row)).collect();
        let tuple: SmallVec<[KeyValue; 4]> = key.iter().map(KeyValue::from).collect();

        if let Some(&first_row) = seen_pairs.get(&(tuple.clone(), value.clone())) {
            return Err(SpecError::DuplicateKeyValue { value, first_row, row });
        }
        seen_pairs.insert((tuple.clone(), value.clone()), row);

        if !value_order.iter().any(|v| *v == value) {
            value_order.push(value.clone());
        }

        match seen_tuples.get(&tuple) {
            Some(&p) => partitions[p].entries.push(row),
            None => {
                seen_tuples.insert(tuple, partitions.len());
                partitions.push(Partition { key: key.clone(), entries: vec![row] });
            }
        }

        rows.push(SpecRow { name, value, key });
    }

    Ok(ValidatedSpec {
        rows,
        key_columns,
        key_types,
        value_order,
        partitions,
    })
}

fn reserved_text_column<'a>(
    spec: &'a Table,
    column: &'static str,
) -> Result<&'a Column, SpecError> {
    let col = spec
        .column(column)
        .ok_or(SpecError::MissingReserved { column })?;
    match col.scalar_type() {
        ScalarType::Text => Ok(col),
        actual => Err(SpecError::ReservedNotText { column, actual }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut names = Vec::new();
        let mut values = Vec::new();
        let mut keys = Vec::new();
        for (name, value, key) in rows {
            names.push(Some(name.to_string()));
            values.push(Some(value.to_string()));
            keys.push(Some(key.to_string()));
        }
        Table::from_columns(vec![
            ("name", Column::text(names)),
            ("value", Column::text(values)),
            ("week", Column::text(keys)),
        ])
        .unwrap()
    }

    #[test]
    fn accepts_well_formed_spec() {
        let spec = spec_table(&[("w1_a", "a", "1"), ("w1_b", "b", "1"), ("w2_a", "a", "2")]);
        let validated = validate(&spec).unwrap();
        assert_eq!(validated.len(), 3);
        assert_eq!(validated.key_columns(), &["week".to_string()]);
        assert_eq!(validated.value_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(validated.partition_count(), 2);
        let names: Vec<&str> = validated.wide_names().collect();
        assert_eq!(names, vec!["w1_a", "w1_b", "w2_a"]);
    }

    #[test]
    fn rejects_missing_reserved_columns() {
        let no_value = Table::from_columns(vec![(
            "name",
            Column::text(vec![Some("a".to_string())]),
        )])
        .unwrap();
        assert_eq!(
            validate(&no_value).unwrap_err(),
            SpecError::MissingReserved { column: "value" }
        );

        let no_name = Table::from_columns(vec![(
            "value",
            Column::text(vec![Some("v".to_string())]),
        )])
        .unwrap();
        assert_eq!(
            validate(&no_name).unwrap_err(),
            SpecError::MissingReserved { column: "name" }
        );
    }

    #[test]
    fn rejects_non_text_reserved_columns() {
        let spec = Table::from_columns(vec![
            ("name", Column::integer(vec![Some(1)])),
            ("value", Column::text(vec![Some("v".to_string())])),
        ])
        .unwrap();
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::ReservedNotText {
                column: "name",
                actual: ScalarType::Integer,
            }
        );
    }

    #[test]
    fn rejects_empty_spec() {
        let spec = Table::from_columns(vec![
            ("name", Column::text(vec![])),
            ("value", Column::text(vec![])),
        ])
        .unwrap();
        assert_eq!(validate(&spec).unwrap_err(), SpecError::Empty);
    }

    #[test]
    fn rejects_missing_and_empty_entries() {
        let spec = Table::from_columns(vec![
            ("name", Column::text(vec![Some("a".to_string()), None])),
            (
                "value",
                Column::text(vec![Some("v".to_string()), Some("v".to_string())]),
            ),
        ])
        .unwrap();
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::MissingEntry { column: "name", row: 1 }
        );

        let spec = Table::from_columns(vec![
            ("name", Column::text(vec![Some("a".to_string())])),
            ("value", Column::text(vec![Some(String::new())])),
        ])
        .unwrap();
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::MissingEntry { column: "value", row: 0 }
        );
    }

    #[test]
    fn reports_duplicate_name_rows() {
        let spec = spec_table(&[("w", "a", "1"), ("x", "a", "2"), ("w", "b", "3")]);
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::DuplicateName {
                name: "w".to_string(),
                first_row: 0,
                row: 2,
            }
        );
    }

    #[test]
    fn reports_duplicate_key_value_pair_rows() {
        // Rows 1 and 2 both claim variable "a" for key tuple ("2").
        let spec = spec_table(&[("w1", "a", "1"), ("w2", "a", "2"), ("w3", "a", "2")]);
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::DuplicateKeyValue {
                value: "a".to_string(),
                first_row: 1,
                row: 2,
            }
        );
    }

    #[test]
    fn rejects_value_named_like_a_key_column() {
        let spec = spec_table(&[("w1", "week", "1")]);
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::ValueCollidesWithKey {
                value: "week".to_string(),
                row: 0,
            }
        );
    }

    #[test]
    fn zero_key_columns_rename_spec_validates() {
        let spec = Table::from_columns(vec![
            (
                "name",
                Column::text(vec![Some("old_a".to_string()), Some("old_b".to_string())]),
            ),
            (
                "value",
                Column::text(vec![Some("a".to_string()), Some("b".to_string())]),
            ),
        ])
        .unwrap();
        let validated = validate(&spec).unwrap();
        assert!(validated.key_columns().is_empty());
        assert_eq!(validated.partition_count(), 1);
    }

    #[test]
    fn zero_key_columns_with_repeated_value_is_rejected() {
        let spec = Table::from_columns(vec![
            (
                "name",
                Column::text(vec![Some("old_a".to_string()), Some("old_b".to_string())]),
            ),
            (
                "value",
                Column::text(vec![Some("a".to_string()), Some("a".to_string())]),
            ),
        ])
        .unwrap();
        assert_eq!(
            validate(&spec).unwrap_err(),
            SpecError::DuplicateKeyValue {
                value: "a".to_string(),
                first_row: 0,
                row: 1,
            }
        );
    }

    #[test]
    fn typed_key_columns_partition_by_value_not_display() {
        // Numeric keys 1.0 and 1 are distinct tuples (different types).
        let spec = Table::from_columns(vec![
            (
                "name",
                Column::text(vec![Some("w1".to_string()), Some("w2".to_string())]),
            ),
            (
                "value",
                Column::text(vec![Some("v".to_string()), Some("v".to_string())]),
            ),
            ("k_num", Column::number(vec![Some(1.0), None])),
            ("k_int", Column::integer(vec![None, Some(1)])),
        ])
        .unwrap();
        let validated = validate(&spec).unwrap();
        assert_eq!(validated.partition_count(), 2);
        assert_eq!(validated.key_columns(), &["k_num".to_string(), "k_int".to_string()]);
    }
}
