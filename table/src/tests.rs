//! FILENAME: table/src/tests.rs
//! PURPOSE: Consolidated unit tests for the table crate.

use crate::column::Column;
use crate::error::TableError;
use crate::selector::{ColumnSelector, SelectError};
use crate::table::Table;
use crate::value::{ScalarType, ScalarValue};

fn sample_table() -> Table {
    Table::from_columns(vec![
        ("id", Column::integer(vec![Some(1), Some(2), Some(3)])),
        (
            "name",
            Column::text(vec![
                Some("ada".to_string()),
                Some("grace".to_string()),
                None,
            ]),
        ),
        ("x_1", Column::number(vec![Some(1.5), None, Some(3.0)])),
        ("x_2", Column::number(vec![Some(2.5), Some(0.0), None])),
        ("active", Column::boolean(vec![Some(true), Some(false), Some(true)])),
    ])
    .unwrap()
}

// ========================================
// SCALAR VALUE TESTS
// ========================================

#[test]
fn display_drops_spurious_decimals() {
    assert_eq!(ScalarValue::Number(3.0).display(), "3");
    assert_eq!(ScalarValue::Number(2.5).display(), "2.5");
    assert_eq!(ScalarValue::Integer(-7).display(), "-7");
    assert_eq!(ScalarValue::Boolean(true).display(), "true");
    assert_eq!(ScalarValue::Missing.display(), "");
}

#[test]
fn total_cmp_orders_across_types() {
    use std::cmp::Ordering;
    let missing = ScalarValue::Missing;
    let num = ScalarValue::Number(1.0);
    let int = ScalarValue::Integer(2);
    let text = ScalarValue::from("a");
    let boolean = ScalarValue::Boolean(false);

    assert_eq!(missing.total_cmp(&num), Ordering::Less);
    assert_eq!(num.total_cmp(&int), Ordering::Less);
    assert_eq!(int.total_cmp(&text), Ordering::Less);
    assert_eq!(text.total_cmp(&boolean), Ordering::Less);
    assert_eq!(
        ScalarValue::Number(f64::NAN).total_cmp(&ScalarValue::Number(f64::NAN)),
        Ordering::Equal
    );
}

#[test]
fn scalar_type_tags() {
    assert_eq!(ScalarValue::Number(0.0).scalar_type(), Some(ScalarType::Number));
    assert_eq!(ScalarValue::Missing.scalar_type(), None);
    assert!(ScalarValue::Missing.is_missing());
}

// ========================================
// COLUMN TESTS
// ========================================

#[test]
fn push_rejects_wrong_type() {
    let mut col = Column::new_empty(ScalarType::Number);
    col.push(ScalarValue::Number(1.0)).unwrap();
    col.push(ScalarValue::Missing).unwrap();

    let err = col.push(ScalarValue::from("oops")).unwrap_err();
    assert_eq!(
        err,
        TableError::TypeMismatch {
            expected: ScalarType::Number,
            actual: ScalarType::Text,
        }
    );
    assert_eq!(col.len(), 2);
}

#[test]
fn value_reads_missing_for_none_and_out_of_range() {
    let col = Column::number(vec![Some(1.0), None]);
    assert_eq!(col.value(0), ScalarValue::Number(1.0));
    assert_eq!(col.value(1), ScalarValue::Missing);
    assert_eq!(col.value(99), ScalarValue::Missing);
    assert!(col.is_missing(1));
    assert!(col.is_missing(99));
}

#[test]
fn from_values_round_trips() {
    let col = Column::from_values(
        ScalarType::Text,
        vec![ScalarValue::from("a"), ScalarValue::Missing, ScalarValue::from("b")],
    )
    .unwrap();
    assert_eq!(col, Column::text(vec![Some("a".to_string()), None, Some("b".to_string())]));
}

#[test]
fn filtered_keeps_masked_rows() {
    let col = Column::integer(vec![Some(1), Some(2), Some(3), None]);
    let kept = col.filtered(&[true, false, true, true]);
    assert_eq!(kept, Column::integer(vec![Some(1), Some(3), None]));
}

#[test]
fn tiled_repeats_whole_column() {
    let col = Column::integer(vec![Some(1), None]);
    assert_eq!(
        col.tiled(3),
        Column::integer(vec![Some(1), None, Some(1), None, Some(1), None])
    );
}

#[test]
fn taken_reorders_rows() {
    let col = Column::text(vec![Some("a".to_string()), Some("b".to_string()), None]);
    assert_eq!(
        col.taken(&[2, 0]),
        Column::text(vec![None, Some("a".to_string())])
    );
}

// ========================================
// TABLE TESTS
// ========================================

#[test]
fn from_columns_checks_shape() {
    let err = Table::from_columns(vec![
        ("a", Column::integer(vec![Some(1), Some(2)])),
        ("b", Column::integer(vec![Some(1)])),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        TableError::LengthMismatch {
            column: "b".to_string(),
            expected: 2,
            actual: 1,
        }
    );

    let err = Table::from_columns(vec![
        ("a", Column::integer(vec![Some(1)])),
        ("a", Column::integer(vec![Some(2)])),
    ])
    .unwrap_err();
    assert_eq!(err, TableError::DuplicateColumn("a".to_string()));
}

#[test]
fn lookup_by_name_and_position() {
    let table = sample_table();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.col_count(), 5);
    assert_eq!(table.column_index("x_2"), Some(3));
    assert_eq!(table.name_at(0), Some("id"));
    assert!(table.has_column("active"));
    assert!(!table.has_column("missing"));
    assert_eq!(table.value_at(0, 1), ScalarValue::Integer(2));
    assert_eq!(table.value_at(2, 1), ScalarValue::Missing);
}

#[test]
fn filtered_table_preserves_columns() {
    let table = sample_table();
    let kept = table.filtered(&[true, false, true]);
    assert_eq!(kept.row_count(), 2);
    assert_eq!(kept.names(), table.names());
    assert_eq!(kept.value_at(0, 1), ScalarValue::Integer(3));
}

#[test]
fn table_serde_round_trip() {
    let table = sample_table();
    let json = serde_json::to_string(&table).unwrap();
    let back: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
}

// ========================================
// SELECTOR TESTS
// ========================================

#[test]
fn names_selector_keeps_given_order() {
    let table = sample_table();
    let selector = ColumnSelector::names(["x_2", "id"]);
    assert_eq!(selector.resolve(&table).unwrap(), vec!["x_2", "id"]);
}

#[test]
fn names_selector_rejects_unknown() {
    let table = sample_table();
    let selector = ColumnSelector::names(["id", "nope"]);
    assert_eq!(
        selector.resolve(&table).unwrap_err(),
        SelectError::UnknownColumn("nope".to_string())
    );
}

#[test]
fn range_selector_is_positional_and_inclusive() {
    let table = sample_table();
    let selector = ColumnSelector::range("name", "x_2");
    assert_eq!(selector.resolve(&table).unwrap(), vec!["name", "x_1", "x_2"]);

    let backwards = ColumnSelector::range("x_2", "name");
    assert_eq!(
        backwards.resolve(&table).unwrap_err(),
        SelectError::BadRange {
            start: "x_2".to_string(),
            end: "name".to_string(),
        }
    );
}

#[test]
fn pattern_selectors_use_table_order() {
    let table = sample_table();
    assert_eq!(
        ColumnSelector::StartsWith("x_".to_string()).resolve(&table).unwrap(),
        vec!["x_1", "x_2"]
    );
    assert_eq!(
        ColumnSelector::Contains("ctiv".to_string()).resolve(&table).unwrap(),
        vec!["active"]
    );
    assert_eq!(
        ColumnSelector::EndsWith("e".to_string()).resolve(&table).unwrap(),
        vec!["name", "active"]
    );
}

#[test]
fn predicate_selector_and_empty_selection() {
    let table = sample_table();
    let selector = ColumnSelector::predicate(|name| name.len() > 10);
    assert_eq!(selector.resolve(&table).unwrap_err(), SelectError::EmptySelection);

    let selector = ColumnSelector::predicate(|name| name.starts_with('x'));
    assert_eq!(selector.resolve(&table).unwrap(), vec!["x_1", "x_2"]);
}
