//! FILENAME: table/src/column.rs
//! PURPOSE: A homogeneous typed sequence of cells with a missing marker.
//! CONTEXT: Columns are tagged unions of typed vectors. Each variant
//! stores `Option<T>` elements; `None` is the missing marker. A column
//! keeps exactly one element type for its whole life - pushing a value
//! of another type is an error, never a coercion.

use serde::{Deserialize, Serialize};
use crate::error::TableError;
use crate::value::{ScalarType, ScalarValue};

/// A typed column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Number(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
}

impl Column {
    pub fn number(values: Vec<Option<f64>>) -> Self {
        Column::Number(values)
    }

    pub fn integer(values: Vec<Option<i64>>) -> Self {
        Column::Integer(values)
    }

    pub fn text(values: Vec<Option<String>>) -> Self {
        Column::Text(values)
    }

    pub fn boolean(values: Vec<Option<bool>>) -> Self {
        Column::Boolean(values)
    }

    /// Creates an empty column of the given type.
    pub fn new_empty(scalar_type: ScalarType) -> Self {
        Column::with_capacity(scalar_type, 0)
    }

    /// Creates an empty column of the given type with reserved capacity.
    pub fn with_capacity(scalar_type: ScalarType, capacity: usize) -> Self {
        match scalar_type {
            ScalarType::Number => Column::Number(Vec::with_capacity(capacity)),
            ScalarType::Integer => Column::Integer(Vec::with_capacity(capacity)),
            ScalarType::Text => Column::Text(Vec::with_capacity(capacity)),
            ScalarType::Boolean => Column::Boolean(Vec::with_capacity(capacity)),
        }
    }

    /// Creates a column of the given type filled with `len` missing cells.
    pub fn new_missing(scalar_type: ScalarType, len: usize) -> Self {
        match scalar_type {
            ScalarType::Number => Column::Number(vec![None; len]),
            ScalarType::Integer => Column::Integer(vec![None; len]),
            ScalarType::Text => Column::Text(vec![None; len]),
            ScalarType::Boolean => Column::Boolean(vec![None; len]),
        }
    }

    /// Builds a column of the given type from owned scalar values.
    /// Every value must be `Missing` or match `scalar_type`.
    pub fn from_values(
        scalar_type: ScalarType,
        values: Vec<ScalarValue>,
    ) -> Result<Self, TableError> {
        let mut column = Column::with_capacity(scalar_type, values.len());
        for value in values {
            column.push(value)?;
        }
        Ok(column)
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Column::Number(_) => ScalarType::Number,
            Column::Integer(_) => ScalarType::Integer,
            Column::Text(_) => ScalarType::Text,
            Column::Boolean(_) => ScalarType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Number(data) => data.len(),
            Column::Integer(data) => data.len(),
            Column::Text(data) => data.len(),
            Column::Boolean(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cell at `row`. Out-of-range rows read as missing.
    pub fn value(&self, row: usize) -> ScalarValue {
        match self {
            Column::Number(data) => data
                .get(row)
                .and_then(|v| *v)
                .map_or(ScalarValue::Missing, ScalarValue::Number),
            Column::Integer(data) => data
                .get(row)
                .and_then(|v| *v)
                .map_or(ScalarValue::Missing, ScalarValue::Integer),
            Column::Text(data) => data
                .get(row)
                .and_then(|v| v.clone())
                .map_or(ScalarValue::Missing, ScalarValue::Text),
            Column::Boolean(data) => data
                .get(row)
                .and_then(|v| *v)
                .map_or(ScalarValue::Missing, ScalarValue::Boolean),
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Number(data) => data.get(row).map_or(true, |v| v.is_none()),
            Column::Integer(data) => data.get(row).map_or(true, |v| v.is_none()),
            Column::Text(data) => data.get(row).map_or(true, |v| v.is_none()),
            Column::Boolean(data) => data.get(row).map_or(true, |v| v.is_none()),
        }
    }

    /// Appends a cell. `Missing` is accepted by every column type;
    /// anything else must match the column's element type.
    pub fn push(&mut self, value: ScalarValue) -> Result<(), TableError> {
        match (self, value) {
            (Column::Number(data), ScalarValue::Missing) => data.push(None),
            (Column::Integer(data), ScalarValue::Missing) => data.push(None),
            (Column::Text(data), ScalarValue::Missing) => data.push(None),
            (Column::Boolean(data), ScalarValue::Missing) => data.push(None),

            (Column::Number(data), ScalarValue::Number(n)) => data.push(Some(n)),
            (Column::Integer(data), ScalarValue::Integer(i)) => data.push(Some(i)),
            (Column::Text(data), ScalarValue::Text(s)) => data.push(Some(s)),
            (Column::Boolean(data), ScalarValue::Boolean(b)) => data.push(Some(b)),

            (column, value) => {
                return Err(TableError::TypeMismatch {
                    expected: column.scalar_type(),
                    // value is not Missing on this arm, so the tag exists
                    actual: value.scalar_type().unwrap_or(column.scalar_type()),
                });
            }
        }
        Ok(())
    }

    /// Returns a copy keeping only rows where `mask` is true.
    /// `mask` must be at least as long as the column.
    pub fn filtered(&self, mask: &[bool]) -> Column {
        fn keep<T: Clone>(data: &[Option<T>], mask: &[bool]) -> Vec<Option<T>> {
            data.iter()
                .zip(mask.iter())
                .filter_map(|(v, &kept)| if kept { Some(v.clone()) } else { None })
                .collect()
        }
        match self {
            Column::Number(data) => Column::Number(keep(data, mask)),
            Column::Integer(data) => Column::Integer(keep(data, mask)),
            Column::Text(data) => Column::Text(keep(data, mask)),
            Column::Boolean(data) => Column::Boolean(keep(data, mask)),
        }
    }

    /// Returns a copy with the whole column repeated `times` times
    /// back to back.
    pub fn tiled(&self, times: usize) -> Column {
        fn tile<T: Clone>(data: &[Option<T>], times: usize) -> Vec<Option<T>> {
            let mut out = Vec::with_capacity(data.len() * times);
            for _ in 0..times {
                out.extend(data.iter().cloned());
            }
            out
        }
        match self {
            Column::Number(data) => Column::Number(tile(data, times)),
            Column::Integer(data) => Column::Integer(tile(data, times)),
            Column::Text(data) => Column::Text(tile(data, times)),
            Column::Boolean(data) => Column::Boolean(tile(data, times)),
        }
    }

    /// Returns a copy keeping only the given rows, in the given order.
    pub fn taken(&self, rows: &[usize]) -> Column {
        fn take<T: Clone>(data: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
            rows.iter()
                .map(|&r| data.get(r).cloned().unwrap_or(None))
                .collect()
        }
        match self {
            Column::Number(data) => Column::Number(take(data, rows)),
            Column::Integer(data) => Column::Integer(take(data, rows)),
            Column::Text(data) => Column::Text(take(data, rows)),
            Column::Boolean(data) => Column::Boolean(take(data, rows)),
        }
    }
}
